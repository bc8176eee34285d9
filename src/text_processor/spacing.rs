//! CJK/ASCII spacing (spec §4.8): insert a single space at CJK/ASCII-alnum
//! boundaries and collapse runs of spaces to one.

fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

pub fn insert_spacing(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let boundary = (is_han(prev) && c.is_ascii_alphanumeric())
                || (prev.is_ascii_alphanumeric() && is_han(c));
            if boundary && prev != ' ' && c != ' ' {
                out.push(' ');
            }
        }
        out.push(c);
    }
    collapse_spaces(&out)
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_space_between_cjk_and_ascii() {
        assert_eq!(insert_spacing("我用Python写代码"), "我用 Python 写代码");
    }

    #[test]
    fn collapses_existing_space_runs() {
        assert_eq!(insert_spacing("我用  Python   写代码"), "我用 Python 写代码");
    }

    #[test]
    fn pure_cjk_text_is_unaffected() {
        assert_eq!(insert_spacing("今天天气很好"), "今天天气很好");
    }
}
