use twoway::find_bytes;

fn is_ident_byte(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'$' | 0x80..=0xFF)
}

/// Returns the largest `$N` placeholder number referenced by the statement
///
/// String literals, quoted identifiers, dollar-quoted bodies and comments are
/// skipped. Unterminated quotes and comments swallow the rest of the
/// statement; the server reports those.
pub fn max_placeholder(sql: &str) -> usize {
    let data = sql.as_bytes();
    let mut max = 0usize;
    let mut iter = data.iter().enumerate().peekable();
    'outer: while let Some((idx, &b)) = iter.next() {
        match b {
            b'\'' => {
                let escapes = idx > 0
                    && matches!(data[idx - 1], b'E' | b'e')
                    && (idx < 2 || !is_ident_byte(data[idx - 2]));
                while let Some((_, &b)) = iter.next() {
                    match b {
                        b'\\' if escapes => {
                            // skip any next char, even quote
                            iter.next();
                        }
                        // doubled quote is an escaped quote
                        b'\'' if iter.peek().map(|&(_, &n)| n) == Some(b'\'') => {
                            iter.next();
                        }
                        b'\'' => continue 'outer,
                        _ => continue,
                    }
                }
                break;
            }
            b'"' => {
                while let Some((_, &b)) = iter.next() {
                    match b {
                        b'"' if iter.peek().map(|&(_, &n)| n) == Some(b'"') => {
                            iter.next();
                        }
                        b'"' => continue 'outer,
                        _ => continue,
                    }
                }
                break;
            }
            b'-' if iter.peek().map(|&(_, &n)| n) == Some(b'-') => {
                while let Some((_, &b)) = iter.next() {
                    if b == b'\n' {
                        continue 'outer;
                    }
                }
                break;
            }
            b'/' if iter.peek().map(|&(_, &n)| n) == Some(b'*') => {
                iter.next();
                let mut depth = 1;
                while let Some((_, &b)) = iter.next() {
                    match (b, iter.peek().map(|&(_, &n)| n)) {
                        (b'*', Some(b'/')) => {
                            iter.next();
                            depth -= 1;
                            if depth == 0 {
                                continue 'outer;
                            }
                        }
                        (b'/', Some(b'*')) => {
                            iter.next();
                            depth += 1;
                        }
                        _ => {}
                    }
                }
                break;
            }
            b'$' if idx > 0 && is_ident_byte(data[idx - 1]) => {
                // part of an identifier like `a$1`
                continue;
            }
            b'$' => {
                match iter.peek().map(|&(_, &n)| n) {
                    Some(b'0'..=b'9') => {
                        let mut num = 0usize;
                        while let Some(&(_, &d)) = iter.peek() {
                            if !d.is_ascii_digit() {
                                break;
                            }
                            num = num.saturating_mul(10).saturating_add((d - b'0') as usize);
                            iter.next();
                        }
                        max = max.max(num);
                        continue;
                    }
                    Some(b'$') => {}
                    Some(b'A'..=b'Z' | b'a'..=b'z' | b'_' | 0x80..=0xFF) => {}
                    // Not a dollar-quote
                    _ => continue,
                }
                while let Some((end_idx, &b)) = iter.next() {
                    match b {
                        b'$' => {
                            let tag = &data[idx..end_idx + 1];
                            if let Some(end) = find_bytes(&data[end_idx + 1..], tag) {
                                iter.nth(end + tag.len() - 1);
                                continue 'outer;
                            }
                            break 'outer;
                        }
                        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | 0x80..=0xFF => continue,
                        // Not a dollar-quote
                        _ => continue 'outer,
                    }
                }
            }
            _ => continue,
        }
    }
    max
}
