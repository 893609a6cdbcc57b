use formats::CountryRecord;

/// Escapes text for insertion into markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn page_error(reason: &str) -> String {
    format!("<p>Error loading page: {}</p>", escape(reason))
}

/// Marker tooltip: country name plus the record's key metrics.
pub fn country_tooltip(record: &CountryRecord) -> String {
    format!(
        "<div class=\"font-semibold\">{}</div>\
         <div class=\"text-sm\">\
         <div>Depression: {}%</div>\
         <div>Anxiety: {}%</div>\
         <div>Year: {}</div>\
         </div>",
        escape(&record.country),
        compute::format::plain(record.depression),
        compute::format::plain(record.anxiety),
        record.year,
    )
}

/// Two equally weighted paragraphs.
pub fn summary_block(sentences: &[String]) -> String {
    let mut out = String::from("<div class=\"space-y-2\">");
    for s in sentences {
        out.push_str("<div>");
        out.push_str(&escape(s));
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

/// A headline followed by a smaller, muted detail line.
pub fn headline_block(headline: &str, detail: &str) -> String {
    format!(
        "<div class=\"space-y-1\"><div>{}</div><div class=\"text-sm text-gray-600\">{}</div></div>",
        escape(headline),
        escape(detail)
    )
}

#[cfg(test)]
mod tests {
    use super::{country_tooltip, escape, page_error};
    use formats::CountryRecord;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(page_error("x<y"), "<p>Error loading page: x&lt;y</p>");
    }

    #[test]
    fn tooltip_lists_metrics() {
        let html = country_tooltip(&CountryRecord::new("Côte d'Ivoire", 5.5, 6.0, 2021));
        assert!(html.contains("Côte d&#39;Ivoire"));
        assert!(html.contains("Depression: 5.5%"));
        assert!(html.contains("Anxiety: 6%"));
        assert!(html.contains("Year: 2021"));
    }
}
