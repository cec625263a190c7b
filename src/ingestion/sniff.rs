//! Field delimiter detection for delimited text.

/// Delimiters considered by [`sniff_delimiter`], in tie-break order.
pub const CANDIDATE_DELIMITERS: &[u8] = b",;\t|";

/// Number of leading records inspected by default.
pub const DEFAULT_SNIFF_RECORDS: usize = 50;

/// Guess the field delimiter from the start of a file.
///
/// Counts each candidate per record outside double quotes (so quoted newlines and quoted
/// delimiters do not count). A candidate must appear in the first record; among those, the one
/// whose count matches the first record's in the most records wins, then the one with the most
/// fields, then the earlier candidate. Returns `None` when no candidate appears in the header
/// (a single-column file).
pub fn sniff_delimiter(sample: &[u8], max_records: usize) -> Option<u8> {
    let counts = record_counts(sample, max_records.max(1));
    let header = counts.first()?;

    let mut best: Option<(usize, usize, u8)> = None;
    for (ci, &delim) in CANDIDATE_DELIMITERS.iter().enumerate() {
        let in_header = header[ci];
        if in_header == 0 {
            continue;
        }
        let consistent = counts.iter().filter(|rec| rec[ci] == in_header).count();
        let better = match best {
            None => true,
            Some((best_consistent, best_fields, _)) => {
                (consistent, in_header) > (best_consistent, best_fields)
            }
        };
        if better {
            best = Some((consistent, in_header, delim));
        }
    }
    best.map(|(_, _, d)| d)
}

/// Per-record occurrence counts of each candidate delimiter, skipping blank records.
fn record_counts(sample: &[u8], max_records: usize) -> Vec<[usize; CANDIDATE_DELIMITERS.len()]> {
    let mut out = Vec::new();
    let mut current = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut record_has_content = false;
    let mut in_quotes = false;

    for &b in sample {
        if out.len() >= max_records {
            return out;
        }
        match b {
            b'"' => {
                in_quotes = !in_quotes;
                record_has_content = true;
            }
            b'\n' if !in_quotes => {
                if record_has_content {
                    out.push(current);
                }
                current = [0; CANDIDATE_DELIMITERS.len()];
                record_has_content = false;
            }
            b'\r' if !in_quotes => {}
            _ => {
                record_has_content = true;
                if !in_quotes {
                    if let Some(ci) = CANDIDATE_DELIMITERS.iter().position(|&d| d == b) {
                        current[ci] += 1;
                    }
                }
            }
        }
    }
    if record_has_content && out.len() < max_records {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_SNIFF_RECORDS, sniff_delimiter};

    #[test]
    fn detects_semicolon() {
        let input = b"codigo;valor;data\nA;1,5;2024-01-01\nB;2,0;2024-01-02\n";
        assert_eq!(sniff_delimiter(input, DEFAULT_SNIFF_RECORDS), Some(b';'));
    }

    #[test]
    fn detects_tab() {
        let input = b"a\tb\n1\t2\n3\t4\n";
        assert_eq!(sniff_delimiter(input, DEFAULT_SNIFF_RECORDS), Some(b'\t'));
    }

    #[test]
    fn ignores_delimiters_inside_quotes() {
        let input = b"name|note\n\"Ada\"|\"a, b, c\"\n\"Grace\"|\"x, y\"\n";
        assert_eq!(sniff_delimiter(input, DEFAULT_SNIFF_RECORDS), Some(b'|'));
    }

    #[test]
    fn prefers_consistent_candidate() {
        // Commas appear in the header but are not consistent across records.
        let input = b"a;b,c;d\n1;2;3\n4;5;6\n";
        assert_eq!(sniff_delimiter(input, DEFAULT_SNIFF_RECORDS), Some(b';'));
    }

    #[test]
    fn single_column_has_no_delimiter() {
        assert_eq!(sniff_delimiter(b"only\n1\n2\n", DEFAULT_SNIFF_RECORDS), None);
        assert_eq!(sniff_delimiter(b"", DEFAULT_SNIFF_RECORDS), None);
    }
}
