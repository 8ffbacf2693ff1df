use std::io::{BufRead, Write};

use watermark_core::{substitute, LogoPreference, Texts};

const MAX_ATTEMPTS: usize = 3;

/// Asks on `output` which logo to use for `source_name`, reading answers
/// from `input`. `None` after EOF or repeated invalid answers.
pub fn ask_logo_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    texts: &Texts,
    source_name: &str,
) -> Option<LogoPreference> {
    for _ in 0..MAX_ATTEMPTS {
        let _ = write!(output, "{}", substitute(texts.logo_prompt, source_name));
        let _ = output.flush();
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }
        if let Some(choice) = LogoPreference::parse(&line) {
            return Some(choice);
        }
    }
    None
}
