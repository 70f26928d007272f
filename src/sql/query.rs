//! Query model - the SELECT / FROM / WHERE shape generated per pipeline.

use super::token::{Token, TokenStream};

// =============================================================================
// Select Items
// =============================================================================

/// A SELECT list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// `'<table>' AS <table>`: marks that the table takes part in the pipeline.
    Membership { table: String },
    /// `<table>.<file_column> AS <table>_<file_column>_<field>`: the field is
    /// not a stored column, so the row's file pointer is selected instead.
    FileFallback {
        table: String,
        field: String,
        file_column: String,
    },
    /// `<table>.<field> AS <table>_<field>`
    Column { table: String, field: String },
}

impl SelectItem {
    /// The output column name this item is aliased to.
    pub fn alias(&self) -> String {
        match self {
            SelectItem::Membership { table } => table.clone(),
            SelectItem::FileFallback {
                table,
                field,
                file_column,
            } => format!("{table}_{file_column}_{field}"),
            SelectItem::Column { table, field } => format!("{table}_{field}"),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            SelectItem::Membership { table } => {
                ts.push(Token::LitString(table.clone()));
            }
            SelectItem::FileFallback {
                table, file_column, ..
            } => {
                ts.ident(table).dot().ident(file_column);
            }
            SelectItem::Column { table, field } => {
                ts.ident(table).dot().ident(field);
            }
        }
        ts.space()
            .push(Token::As)
            .space()
            .push(Token::Ident(self.alias()));
        ts
    }
}

// =============================================================================
// Table Reference
// =============================================================================

/// A table in the FROM / JOIN chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: String,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.ident(&self.table);
        ts
    }
}

// =============================================================================
// Joins
// =============================================================================

/// `INNER JOIN <parent> ON <child>.<parent_column> = <parent>.<id_column>`
///
/// Links a step's rows to the rows of the step that produced their input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub child: String,
    pub table: TableRef,
    pub parent_column: String,
    pub id_column: String,
}

impl Join {
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Inner).space().push(Token::Join).space();
        ts.append(&self.table.to_tokens());
        ts.space()
            .push(Token::On)
            .space()
            .ident(&self.child)
            .dot()
            .ident(&self.parent_column)
            .space()
            .push(Token::Eq)
            .space()
            .ident(&self.table.table)
            .dot()
            .ident(&self.id_column);
        ts
    }
}

// =============================================================================
// WHERE
// =============================================================================

/// A WHERE clause in disjunctive normal form.
///
/// Groups are ORed; predicates inside a group are ANDed. Predicates are
/// written as given. A group with no predicates renders as `()` and an
/// empty clause renders as a bare `WHERE `.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    pub groups: Vec<Vec<String>>,
}

impl WhereClause {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        Self { groups }
    }

    /// True if some group kept no predicates.
    pub fn has_empty_group(&self) -> bool {
        self.groups.iter().any(Vec::is_empty)
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Where).space();
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                ts.space().push(Token::Or).space();
            }
            ts.lparen();
            for (j, predicate) in group.iter().enumerate() {
                if j > 0 {
                    ts.space().push(Token::And).space();
                }
                ts.lparen().push(Token::Raw(predicate.clone())).rparen();
            }
            ts.rparen();
        }
        ts
    }
}

// =============================================================================
// Query
// =============================================================================

/// One query over a single pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or to_tokens()"]
pub struct Query {
    pub select: Vec<SelectItem>,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub where_clause: WhereClause,
}

impl Query {
    /// Create a query reading from `table` with an empty SELECT list.
    pub fn new(from: TableRef) -> Self {
        Self {
            select: Vec::new(),
            from,
            joins: Vec::new(),
            where_clause: WhereClause::default(),
        }
    }

    /// Set the SELECT list.
    pub fn select(mut self, items: Vec<SelectItem>) -> Self {
        self.select = items;
        self
    }

    /// Add an INNER JOIN from `child` to its parent step `table`.
    pub fn inner_join(
        mut self,
        child: &str,
        table: TableRef,
        parent_column: &str,
        id_column: &str,
    ) -> Self {
        self.joins.push(Join {
            child: child.into(),
            table,
            parent_column: parent_column.into(),
            id_column: id_column.into(),
        });
        self
    }

    /// Set the WHERE clause.
    pub fn filter(mut self, where_clause: WhereClause) -> Self {
        self.where_clause = where_clause;
        self
    }

    /// `SELECT ` followed by the comma-separated select items.
    pub fn select_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Select).space();
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&item.to_tokens());
        }
        ts
    }

    /// `FROM <table>` followed by the join chain.
    pub fn from_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::From).space();
        ts.append(&self.from.to_tokens());
        for join in &self.joins {
            ts.space();
            ts.append(&join.to_tokens());
        }
        ts
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = self.select_tokens();
        ts.space();
        ts.append(&self.from_tokens());
        ts.space();
        ts.append(&self.where_clause.to_tokens());
        ts
    }

    /// Generate the SQL string.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

// =============================================================================
// Tests
// =============================================================================
