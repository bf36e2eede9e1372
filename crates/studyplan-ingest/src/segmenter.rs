use studyplan_core::Page;

/// Pages from a text-layer strategy, numbered from 1.
pub fn pages_from_layer(texts: &[String]) -> Vec<Page> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Page::new(i + 1, text, false))
        .collect()
}

/// Partition flat OCR output into `page_count` pseudo-pages.
///
/// Segments are `chunk = max(1, len / page_count)` characters long and start
/// at `i * chunk`; the remainder left by the integer division is not
/// redistributed, so trailing characters past `page_count * chunk` are dropped.
/// A page count of 0 or 1 yields the whole text as one page.
pub fn split_into_pages(text: &str, page_count: usize) -> Vec<Page> {
    if page_count <= 1 {
        return vec![Page::new(1, text, true)];
    }

    let chars: Vec<char> = text.chars().collect();
    let chunk = (chars.len() / page_count).max(1);

    (0..page_count)
        .map(|i| {
            let start = (i * chunk).min(chars.len());
            let end = ((i + 1) * chunk).min(chars.len());
            let segment: String = chars[start..end].iter().collect();
            Page::new(i + 1, &segment, true)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split() {
        let text = "a".repeat(1000);
        let pages = split_into_pages(&text, 10);
        assert_eq!(pages.len(), 10);
        assert!(pages.iter().all(|p| p.text.len() == 100 && p.ocr));
        let numbers: Vec<_> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn remainder_is_truncated() {
        // 10 chars over 3 pages: chunk = 3, the final "j" falls off.
        let pages = split_into_pages("abcdefghij", 3);
        let texts: Vec<_> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["abc", "def", "ghi"]);
    }

    #[test]
    fn more_pages_than_characters() {
        let pages = split_into_pages("xy", 5);
        let texts: Vec<_> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["x", "y", "", "", ""]);
    }

    #[test]
    fn single_page_is_unsplit_but_trimmed() {
        let pages = split_into_pages("  Chapter 1\nText  \n", 1);
        assert_eq!(pages, vec![Page::new(1, "Chapter 1\nText", true)]);
        assert_eq!(split_into_pages("abc", 0).len(), 1);
    }

    #[test]
    fn segments_are_trimmed_and_char_based() {
        let pages = split_into_pages("é é é é ", 2);
        assert_eq!(pages[0].text, "é é");
        assert_eq!(pages[1].text, "é é");
    }

    #[test]
    fn layer_pages_are_numbered_and_trimmed() {
        let pages = pages_from_layer(&[" one ".to_string(), String::new()]);
        assert_eq!(pages[0], Page::new(1, "one", false));
        assert_eq!(pages[1].page_number, 2);
        assert!(pages[1].text.is_empty());
    }
}
