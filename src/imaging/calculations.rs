//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Parse an aspect ratio into a width/height ratio.
///
/// Accepts `W:H`, `W/H` or a plain decimal (`0.8`).
///
/// ```
/// # use opera_roster::imaging::parse_aspect;
/// assert_eq!(parse_aspect("4:5").unwrap(), 0.8);
/// assert_eq!(parse_aspect("16/9").unwrap(), 16.0 / 9.0);
/// assert_eq!(parse_aspect("1.5").unwrap(), 1.5);
/// ```
pub fn parse_aspect(input: &str) -> Result<f64, String> {
    let input = input.trim();
    let ratio = match input.split_once([':', '/']) {
        Some((w, h)) => {
            let w = parse_positive(w, input)?;
            let h = parse_positive(h, input)?;
            w / h
        }
        None => parse_positive(input, input)?,
    };
    Ok(ratio)
}

fn parse_positive(part: &str, whole: &str) -> Result<f64, String> {
    match part.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!(
            "invalid aspect ratio {whole:?} (expected W:H, W/H or a positive decimal)"
        )),
    }
}

/// Output dimensions for an import.
///
/// An explicit `height` wins over the aspect ratio. The derived height is
/// never below one pixel.
///
/// # Examples
/// ```
/// # use opera_roster::imaging::target_dimensions;
/// // 800 wide at 4:5 → 800x1000
/// assert_eq!(target_dimensions(800, None, 0.8), (800, 1000));
/// // explicit height ignores the aspect
/// assert_eq!(target_dimensions(800, Some(600), 0.8), (800, 600));
/// ```
pub fn target_dimensions(width: u32, height: Option<u32>, aspect: f64) -> (u32, u32) {
    let height = height.unwrap_or_else(|| (width as f64 / aspect).round().max(1.0) as u32);
    (width, height)
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Top-left corner of a centered `target` window inside `fill`.
pub fn center_crop_offset(fill: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        fill.0.saturating_sub(target.0) / 2,
        fill.1.saturating_sub(target.1) / 2,
    )
}
