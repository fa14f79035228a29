/// Reassembles `[platform]/[size]items` and applies the display spacing used on labels.
pub fn compose(platform: &str, size: &str, items: &str) -> String {
    tidy(&format!("[{}]/[{}]{}", platform, size, items))
}

/// Cosmetic pass: no stray spaces, `", "` between items, `" *"` before multipliers and a
/// space between a closing bracket and a following letter.
pub fn tidy(label: &str) -> String {
    let compact: Vec<char> = label.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(compact.len() + 8);

    for (i, &c) in compact.iter().enumerate() {
        match c {
            ',' => out.push_str(", "),
            '*' => out.push_str(" *"),
            ']' => {
                out.push(']');
                if compact.get(i + 1).is_some_and(|next| next.is_alphabetic()) {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Text after the last `]`, whitespace removed. Used to order shipments by their SKUs.
pub fn item_key(label: &str) -> String {
    let tail = match label.rfind(']') {
        Some(close) => &label[close + 1..],
        None => label,
    };
    tail.chars().filter(|c| !c.is_whitespace()).collect()
}
