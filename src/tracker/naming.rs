/// Title-case a user-entered name: surrounding whitespace is trimmed, every
/// letter that follows a non-letter is uppercased and every other letter is
/// lowercased ("acme corp" -> "Acme Corp", "o'neil-smith" -> "O'Neil-Smith").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
