use crate::model::core::RoutingProblem;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

/// Renders the routing area, both chips, their bumps and any reconstructed
/// routes to a PNG.
pub fn draw_problem(problem: &RoutingProblem, filename: &str, width: u32, height: u32) {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([20, 20, 20, 255]));

    let area_w = problem.area.width() as f64;
    let area_h = problem.area.height() as f64;
    if area_w <= 0.0 || area_h <= 0.0 {
        return;
    }

    let scale_x = width as f64 / area_w;
    let scale_y = height as f64 / area_h;

    let map = |x: i32, y: i32| {
        (
            (x - problem.area.min.x) as f64 * scale_x,
            height as f64 - (y - problem.area.min.y) as f64 * scale_y,
        )
    };

    // Chip1: yellow with blue bumps. Chip2: orange with green bumps.
    let chip_colors = [Rgba([200, 180, 40, 255]), Rgba([220, 140, 30, 255])];
    let bump_colors = [Rgba([60, 120, 255, 255]), Rgba([40, 200, 90, 255])];

    for i in 0..2 {
        let chip = &problem.chips[i];
        let (x, y_bot) = map(chip.rect.min.x, chip.rect.min.y);
        let w = (chip.rect.width() as f64 * scale_x).max(2.0);
        let h = (chip.rect.height() as f64 * scale_y).max(2.0);
        let rect = ImageRect::at(x as i32, (y_bot - h) as i32).of_size(w as u32, h as u32);
        draw_filled_rect_mut(&mut img, rect, chip_colors[i]);

        for bump in &chip.bumps {
            let (bx, by) = map(bump.position.x, bump.position.y);
            let rect = ImageRect::at(bx as i32 - 1, by as i32 - 1).of_size(3, 3);
            draw_filled_rect_mut(&mut img, rect, bump_colors[i]);
        }
    }

    let route_colors = [
        Rgba([180, 50, 255, 255]),
        Rgba([255, 150, 0, 255]),
        Rgba([150, 90, 40, 255]),
        Rgba([255, 120, 180, 255]),
        Rgba([140, 140, 140, 255]),
        Rgba([0, 220, 255, 255]),
    ];
    for (i, net) in problem.nets.values().enumerate() {
        let color = route_colors[i % route_colors.len()];
        for pair in net.points.windows(2) {
            let (x1, y1) = map(pair[0].x, pair[0].y);
            let (x2, y2) = map(pair[1].x, pair[1].y);
            draw_line_segment_mut(
                &mut img,
                (x1 as f32, y1 as f32),
                (x2 as f32, y2 as f32),
                color,
            );
        }
    }

    if let Err(e) = img.save(Path::new(filename)) {
        log::error!("Failed to write {}: {}", filename, e);
    }
}
