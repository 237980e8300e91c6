//! Topic filter for article listings.

/// Optional equality filter on `articles.topic`.
///
/// The predicate text is fixed; the slug always travels as bind parameter
/// `$1`, exactly as given. With no topic, or an empty one, the parameter is
/// bound as `NULL` and the predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter(Option<String>);

static TOPIC_PREDICATE: &str = "($1::VARCHAR IS NULL OR articles.topic = $1)";

impl TopicFilter {
    pub fn new(topic: Option<String>) -> Self {
        TopicFilter(topic.and_then(|topic| if topic.is_empty() { None } else { Some(topic) }))
    }

    pub fn topic(&self) -> Option<&str> {
        self.0.as_ref().map(String::as_str)
    }

    /// Value bound to `$1`.
    pub fn bind_value(&self) -> Option<String> {
        self.0.clone()
    }

    pub fn predicate(&self) -> &'static str {
        TOPIC_PREDICATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use diesel::pg::Pg;
    use diesel::sql_query;
    use diesel::sql_types::{Nullable, Text};

    #[test]
    fn empty_topics_filter_nothing() {
        assert_eq!(TopicFilter::new(Some("".into())).topic(), None);
        assert_eq!(TopicFilter::new(None).bind_value(), None);
        assert_eq!(TopicFilter::new(Some("mitch".into())).topic(), Some("mitch"));
    }

    #[test]
    fn topic_is_bound_as_given() {
        let filter = TopicFilter::new(Some(" mitch ".into()));
        assert_eq!(filter.bind_value(), Some(" mitch ".to_owned()));
        assert_eq!(TopicFilter::new(Some("  ".into())).topic(), Some("  "));
    }

    #[test]
    fn topic_is_bound_not_spliced() {
        let filter = TopicFilter::new(Some("mitch' OR '1'='1".into()));
        let query = sql_query(format!("SELECT 1 FROM articles WHERE {}", filter.predicate()))
            .bind::<Nullable<Text>, _>(filter.bind_value());
        let rendered = debug_query::<Pg, _>(&query).to_string();
        let (sql, binds) = rendered.split_at(rendered.find("-- binds").expect("binds listed"));
        assert!(!sql.contains("mitch"));
        assert!(sql.contains("articles.topic = $1"));
        assert!(binds.contains("mitch' OR '1'='1"));
    }
}
