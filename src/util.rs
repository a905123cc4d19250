pub const LABEL_WIDTH: usize = 10;

pub fn wrap_label(text: &str, width: usize) -> String {
    let width = width.max(1);
    let chars = text.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return text.to_owned();
    }

    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head = chars.by_ref().take(max).collect::<String>();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
