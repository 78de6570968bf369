use serde::{Deserialize, Serialize};

/// Collection type tags for versioned relations owned by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Table,
    Channel,
    Scratch,
    Periodic,
    Stdin,
    Stdout,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Table => "table",
            CollectionKind::Channel => "channel",
            CollectionKind::Scratch => "scratch",
            CollectionKind::Periodic => "periodic",
            CollectionKind::Stdin => "stdin",
            CollectionKind::Stdout => "stdout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "table" => Some(CollectionKind::Table),
            "channel" => Some(CollectionKind::Channel),
            "scratch" => Some(CollectionKind::Scratch),
            "periodic" => Some(CollectionKind::Periodic),
            "stdin" => Some(CollectionKind::Stdin),
            "stdout" => Some(CollectionKind::Stdout),
            _ => None,
        }
    }
}

/// Declared SQL type of one collection column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlType {
    /// The type name used in CREATE TABLE.
    pub fn sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(SqlType::Integer),
            "real" => Some(SqlType::Real),
            "text" => Some(SqlType::Text),
            "blob" => Some(SqlType::Blob),
            _ => None,
        }
    }
}

/// One declared column of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: SqlType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Which backward-lineage strategy resolves a collection's predecessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineageSpec {
    /// Explicit edges in the node's lineage table.
    Regular,
    /// A registered, parameterized declarative lookup keyed by tuple id.
    Query { name: String },
    /// A named, dynamically bound extension function.
    Extension { name: String },
}

impl LineageSpec {
    /// The catalog's (lineage_type, lineage_target) encoding.
    pub fn encode(&self) -> (&'static str, Option<&str>) {
        match self {
            LineageSpec::Regular => ("regular", None),
            LineageSpec::Query { name } => ("query", Some(name)),
            LineageSpec::Extension { name } => ("extension", Some(name)),
        }
    }

    pub fn decode(ty: &str, target: Option<&str>) -> Option<Self> {
        match (ty, target) {
            ("regular", _) => Some(LineageSpec::Regular),
            ("query", Some(name)) => Some(LineageSpec::Query {
                name: name.to_string(),
            }),
            ("extension", Some(name)) => Some(LineageSpec::Extension {
                name: name.to_string(),
            }),
            _ => None,
        }
    }
}

/// Catalog entry for one named, versioned relation owned by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub node: String,
    pub name: String,
    pub kind: CollectionKind,
    pub columns: Vec<ColumnSpec>,
    pub lineage: LineageSpec,
}

impl CollectionSpec {
    pub fn new(
        node: impl Into<String>,
        name: impl Into<String>,
        kind: CollectionKind,
        columns: Vec<ColumnSpec>,
    ) -> Self {
        Self {
            node: node.into(),
            name: name.into(),
            kind,
            columns,
            lineage: LineageSpec::Regular,
        }
    }

    pub fn with_lineage(mut self, lineage: LineageSpec) -> Self {
        self.lineage = lineage;
        self
    }

    /// The history table backing this collection.
    pub fn table_name(&self) -> String {
        format!("{}_{}", self.node, self.name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}
