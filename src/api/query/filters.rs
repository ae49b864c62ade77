//! OData filter building

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field ne null`, the usual way to ask for populated columns
    NotNull(String),
}

impl Filter {
    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull(field.into())
    }

    /// Convert filter to OData query string
    pub fn to_odata_string(&self) -> String {
        match self {
            Filter::NotNull(field) => format!("{} ne null", field),
        }
    }
}
