use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub area: AreaConfig,
    #[serde(default)]
    pub chip1: ChipConfig,
    #[serde(default = "default_chip2")]
    pub chip2: ChipConfig,
    #[serde(default)]
    pub nets: NetConfig,
    #[serde(default)]
    pub cost: CostConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            area: AreaConfig::default(),
            chip1: ChipConfig::default(),
            chip2: default_chip2(),
            nets: NetConfig::default(),
            cost: CostConfig::default(),
            capacity: CapacityConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AreaConfig {
    #[serde(default = "default_area_x")]
    pub x: i32,
    #[serde(default = "default_area_y")]
    pub y: i32,
    #[serde(default = "default_area_width")]
    pub width: i32,
    #[serde(default = "default_area_height")]
    pub height: i32,
    #[serde(default = "default_gcell_width")]
    pub gcell_width: i32,
    #[serde(default = "default_gcell_height")]
    pub gcell_height: i32,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            x: default_area_x(),
            y: default_area_y(),
            width: default_area_width(),
            height: default_area_height(),
            gcell_width: default_gcell_width(),
            gcell_height: default_gcell_height(),
        }
    }
}

/// Chip placement, relative to the routing-area lower-left corner.
#[derive(Debug, Deserialize)]
pub struct ChipConfig {
    #[serde(default = "default_chip1_x")]
    pub x: i32,
    #[serde(default = "default_chip1_y")]
    pub y: i32,
    #[serde(default = "default_chip_width")]
    pub width: i32,
    #[serde(default = "default_chip_height")]
    pub height: i32,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            x: default_chip1_x(),
            y: default_chip1_y(),
            width: default_chip_width(),
            height: default_chip_height(),
        }
    }
}

fn default_chip2() -> ChipConfig {
    ChipConfig {
        x: default_chip2_x(),
        y: default_chip2_y(),
        width: default_chip_width(),
        height: default_chip_height(),
    }
}

#[derive(Debug, Deserialize)]
pub struct NetConfig {
    #[serde(default = "default_net_count")]
    pub count: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            count: default_net_count(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default = "default_delta")]
    pub delta: f64,
    #[serde(default = "default_via_cost")]
    pub via_cost: f64,
    #[serde(default = "default_on_chip_base")]
    pub on_chip_base: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
            delta: default_delta(),
            via_cost: default_via_cost(),
            on_chip_base: default_on_chip_base(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CapacityConfig {
    #[serde(default = "default_capacity_min")]
    pub min: u32,
    #[serde(default = "default_capacity_max")]
    pub max: u32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            min: default_capacity_min(),
            max: default_capacity_max(),
        }
    }
}

fn default_area_x() -> i32 {
    0
}

fn default_area_y() -> i32 {
    0
}

fn default_area_width() -> i32 {
    15000
}

fn default_area_height() -> i32 {
    10000
}

fn default_gcell_width() -> i32 {
    10
}

fn default_gcell_height() -> i32 {
    10
}

fn default_chip1_x() -> i32 {
    400
}

fn default_chip1_y() -> i32 {
    400
}

fn default_chip2_x() -> i32 {
    13600
}

fn default_chip2_y() -> i32 {
    8600
}

fn default_chip_width() -> i32 {
    1000
}

fn default_chip_height() -> i32 {
    1000
}

fn default_net_count() -> usize {
    500
}

fn default_alpha() -> f64 {
    1.1
}

fn default_beta() -> f64 {
    100.0
}

fn default_gamma() -> f64 {
    1.1
}

fn default_delta() -> f64 {
    0.7
}

fn default_via_cost() -> f64 {
    20.0
}

fn default_on_chip_base() -> f64 {
    50.0
}

fn default_capacity_min() -> u32 {
    1
}

fn default_capacity_max() -> u32 {
    3
}
