//! Shell-style argument splitting.

/// Split a raw command line into tokens.
///
/// Tokens are separated by runs of whitespace; matching double quotes group
/// their contents, embedded whitespace included, into one token with the
/// quotes stripped. An unterminated quote swallows the rest of the line
/// rather than failing. Empty input yields a single empty token, so callers
/// can always treat element 0 as the command name.
pub fn split_args(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                // A quote opens a token even when it encloses nothing.
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    if tokens.is_empty() {
        tokens.push(String::new());
    }
    tokens
}
