/// Extract the suggested filename from a `Content-Disposition` header value,
/// matching the `filename="<name>"` pattern.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let rest = &header[header.find("filename=\"")? + "filename=\"".len()..];
    let end = rest.find('"')?;
    if end == 0 {
        return None;
    }
    Some(rest[..end].to_string())
}

/// A suggested filename is usable only as a bare name. Anything that could
/// reach outside the output directory once joined, a path separator, a
/// parent-directory component, an empty name, is refused and the caller
/// falls back to its default.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}
