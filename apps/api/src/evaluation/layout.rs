//! Heuristic layout score for plain resume text, out of 20.

const BULLET_GLYPHS: [char; 3] = ['-', '*', '•'];
const CONTACT_KEYWORDS: [&str; 4] = ["email", "phone", "contact", "@"];

const MIN_BULLETS: usize = 6;
const MIN_SECTION_BREAKS: usize = 4;

const BULLET_POINTS: u32 = 7;
const SECTION_POINTS: u32 = 7;
const CONTACT_POINTS: u32 = 6;

/// Scores bullet usage, section spacing and the presence of contact details.
pub fn layout_check(resume_text: &str) -> u32 {
    let lines: Vec<&str> = resume_text.lines().collect();
    let mut score = 0;

    let bullets = lines
        .iter()
        .filter(|line| line.trim_start().starts_with(BULLET_GLYPHS))
        .count();
    if bullets >= MIN_BULLETS {
        score += BULLET_POINTS;
    }

    // A section break is a blank line that directly follows a non-blank one.
    let section_breaks = lines
        .windows(2)
        .filter(|pair| !pair[0].trim().is_empty() && pair[1].trim().is_empty())
        .count();
    if section_breaks >= MIN_SECTION_BREAKS {
        score += SECTION_POINTS;
    }

    let lower = resume_text.to_lowercase();
    if CONTACT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        score += CONTACT_POINTS;
    }

    score
}
