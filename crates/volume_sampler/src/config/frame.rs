//! Frame-number substitution in file paths.
//!
//! Only the basename is rewritten. Recognized patterns, in priority order:
//! - `<frame>` or `<frame:N>` (zero-padded to `N` digits when `N > 1`)
//! - a run of `#`, zero-padded to the run length
//! - a printf-style `%d` or `%0Nd`
use tracing::{debug, warn};

/// Replaces the frame pattern in the basename of `path` with `floor(frame)`.
///
/// A basename without any pattern is returned unchanged with a warning.
pub fn substitute_frame(path: &str, frame: f64) -> String {
    let iframe = frame.floor() as i64;
    let (dirname, basename) = match path.rfind(['/', '\\']) {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    };

    let replaced = frame_token(basename, iframe)
        .or_else(|| hash_run(basename, iframe))
        .or_else(|| printf_token(basename, iframe));

    let basename = match replaced {
        Some(b) => {
            debug!("Replaced frame pattern in basename: {}", b);
            b
        }
        None => {
            warn!("No frame pattern in file name: \"{}\"", basename);
            basename.to_string()
        }
    };

    if dirname.is_empty() {
        basename
    } else {
        format!("{}/{}", dirname, basename)
    }
}

fn padded(frame: i64, width: usize) -> String {
    format!("{:0width$}", frame, width = width)
}

/// `<frame>` / `<frame:N>`; the last occurrence wins.
fn frame_token(basename: &str, frame: i64) -> Option<String> {
    let start = basename.rfind("<frame")?;
    let end = start + basename[start..].find('>')?;
    let token = &basename[start..=end];

    let width = match token[..token.len() - 1].split_once(':') {
        Some((_, pad)) => match pad.trim().parse::<usize>() {
            Ok(n) if n > 1 => n,
            Ok(n) => {
                warn!("Invalid <frame> padding {} in {}. Assume no padding", n, token);
                0
            }
            Err(_) => {
                warn!("Invalid <frame> token format: {}. Assume no padding", token);
                0
            }
        },
        None => 0,
    };

    Some(format!(
        "{}{}{}",
        &basename[..start],
        padded(frame, width),
        &basename[end + 1..]
    ))
}

/// Last run of `#`.
fn hash_run(basename: &str, frame: i64) -> Option<String> {
    let last = basename.rfind('#')?;
    let first = basename[..last]
        .char_indices()
        .rev()
        .find(|&(_, c)| c != '#')
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let width = last - first + 1;
    Some(format!(
        "{}{}{}",
        &basename[..first],
        padded(frame, width),
        &basename[last + 1..]
    ))
}

/// First `%d` or `%0Nd`.
fn printf_token(basename: &str, frame: i64) -> Option<String> {
    let bytes = basename.as_bytes();
    for (i, _) in basename.match_indices('%') {
        let Some(digits_end) = bytes[i + 1..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map(|n| i + 1 + n)
        else {
            continue;
        };
        if bytes[digits_end] != b'd' {
            continue;
        }
        let digits = &basename[i + 1..digits_end];
        let width = digits.parse::<usize>().unwrap_or(0);
        return Some(format!(
            "{}{}{}",
            &basename[..i],
            padded(frame, width),
            &basename[digits_end + 1..]
        ));
    }
    None
}
