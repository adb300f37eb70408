//! Splitting an assembled argument string back into argv
//!
//! The task assembles one command-line string whose quoting follows the
//! Windows convention: double quotes group whitespace and are removed,
//! backslashes are literal unless they run into a quote. Spawning on Unix
//! needs discrete arguments, so the string is split here with the same rules.

/// Split a command-line string into arguments
///
/// - whitespace outside quotes separates arguments
/// - `"` toggles quoting and is dropped
/// - `2n` backslashes before a `"` become `n` backslashes and the quote toggles
/// - `2n + 1` backslashes before a `"` become `n` backslashes and a literal `"`
/// - backslashes not followed by `"` are kept as-is
/// - `""` yields an empty argument
#[must_use]
pub fn split_command_line(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\\' => {
                let run = chars[i..].iter().take_while(|&&c| c == '\\').count();
                in_arg = true;
                i += run;
                if chars.get(i).copied() == Some('"') {
                    current.extend(std::iter::repeat_n('\\', run / 2));
                    if run % 2 == 1 {
                        current.push('"');
                        i += 1;
                    }
                } else {
                    current.extend(std::iter::repeat_n('\\', run));
                }
                continue;
            }
            '"' => {
                in_quotes = !in_quotes;
                in_arg = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
        i += 1;
    }

    if in_arg {
        args.push(current);
    }

    args
}
