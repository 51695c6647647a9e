use std::io::{self, BufRead};

/// Iterates over the lines of a reader, replacing invalid UTF-8 instead of failing.
///
/// Output files occasionally contain stray bytes in echoed input or banners; a bad
/// byte must not cost the rest of the file.
pub(crate) struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Parses a float, accepting Fortran `D` exponents (`-1.234D-05`).
pub(crate) fn parse_float(token: &str) -> Option<f64> {
    let token = token.trim();
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// The whitespace-separated token at `index`, parsed as a float.
pub(crate) fn float_at(line: &str, index: usize) -> Option<f64> {
    line.split_whitespace().nth(index).and_then(parse_float)
}

/// The first token after the first occurrence of `marker`, parsed as a float.
pub(crate) fn float_after(line: &str, marker: &str) -> Option<f64> {
    let pos = line.find(marker)?;
    line[pos + marker.len()..]
        .split_whitespace()
        .next()
        .and_then(parse_float)
}

/// The first token of the line that parses as a float.
pub(crate) fn first_float(line: &str) -> Option<f64> {
    line.split_whitespace().find_map(parse_float)
}

/// Splits a `name value threshold YES|NO` convergence row.
pub(crate) fn convergence_row(line: &str) -> Option<(String, Option<f64>, Option<f64>, bool)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return None;
    }
    let flag = match tokens[tokens.len() - 1] {
        "YES" => true,
        "NO" => false,
        _ => return None,
    };
    let name = tokens[..tokens.len() - 3].join(" ");
    let value = parse_float(tokens[tokens.len() - 3]);
    let threshold = parse_float(tokens[tokens.len() - 2]);
    Some((name, value, threshold, flag))
}
