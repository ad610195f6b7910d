use url::form_urlencoded::byte_serialize;

/// Renders ordered parameters as a query string. `None` values are skipped and
/// an empty parameter list renders as `""`.
pub fn build_query(params: &[(&str, Option<String>)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", encode(key), encode(v)))
        })
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// PostgREST query parameters. Filter values are passed through verbatim as
/// `column=operator.value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, Option<String>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns)
    }

    pub fn order(self, column: &str, descending: bool) -> Self {
        let direction = if descending { "desc" } else { "asc" };
        self.param("order", &format!("{}.{}", column, direction))
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.param(column, &format!("eq.{}", value))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.param(column, "is.null")
    }

    pub fn not_null(self, column: &str) -> Self {
        self.param(column, "not.is.null")
    }

    pub fn in_list<S: AsRef<str>>(self, column: &str, values: &[S]) -> Self {
        let joined: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        self.param(column, &format!("in.({})", joined.join(",")))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", &limit.to_string())
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), Some(value.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `?`-prefixed query string, or `""` when no parameters were added.
    pub fn to_query_string(&self) -> String {
        let borrowed: Vec<(&str, Option<String>)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        build_query(&borrowed)
    }

    pub fn path_for(&self, table: &str) -> String {
        format!("{}{}", table, self.to_query_string())
    }
}
