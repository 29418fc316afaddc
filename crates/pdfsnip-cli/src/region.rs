/// Parse a region string like "10,20,110,220" into `[x0, y0, x1, y1]`.
///
/// Corners may come in either order; normalization happens downstream.
/// Returns an error for anything other than four comma-separated numbers.
pub fn parse_region(input: &str) -> Result<[f64; 4], String> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!(
            "invalid region '{input}': expected four comma-separated numbers"
        ));
    }

    let mut corners = [0.0; 4];
    for (slot, part) in corners.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("invalid region coordinate: '{part}'"))?;
    }
    Ok(corners)
}

/// Parse a coordinate pair like "12,34" into `(x, y)`.
pub fn parse_pair(input: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(format!("invalid coordinate pair '{input}': expected 'X,Y'"));
    }

    let x = parts[0]
        .parse()
        .map_err(|_| format!("invalid coordinate: '{}'", parts[0]))?;
    let y = parts[1]
        .parse()
        .map_err(|_| format!("invalid coordinate: '{}'", parts[1]))?;
    Ok((x, y))
}
