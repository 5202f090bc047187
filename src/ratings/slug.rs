use deunicode::deunicode;

const STRIPPED: [char; 8] = [':', '\'', '.', ',', '!', '?', '%', '$'];

pub fn title_slug(title: &str) -> String {
    let ascii = deunicode(title);
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .replace('&', "and")
}

pub fn candidate_slugs(title: &str, year: &str) -> Vec<String> {
    let slug = title_slug(title);
    if slug.is_empty() {
        return Vec::new();
    }
    let mut out = vec![slug.clone()];
    if let Ok(y) = year.trim().parse::<u16>() {
        out.push(format!("{}_{}", slug, y));
        if let Some(prev) = y.checked_sub(1) {
            out.push(format!("{}_{}", slug, prev));
        }
    }
    out
}
