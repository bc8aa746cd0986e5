use web_sys as web;

/// Match the canvas backing store to its CSS size times the device pixel ratio.
/// Returns the new pixel size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() * dpr) as u32).max(1);
    let h_px = ((rect.height() * dpr) as u32).max(1);
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    (w_px, h_px)
}
