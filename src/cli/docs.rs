//! Documentation content for the iql CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Paths,
    Constraints,
    Functions,
    Subqueries,
    Types,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "paths" | "path" | "aliases" => Some(Self::Paths),
            "constraints" | "constraint" | "where" => Some(Self::Constraints),
            "functions" | "function" | "aggregates" => Some(Self::Functions),
            "subqueries" | "subquery" => Some(Self::Subqueries),
            "types" | "type" => Some(Self::Types),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"IQL DOCUMENTATION

IQL is an SQL-like query language over a typed object model. Queries name
classes in FROM, walk their fields with dotted paths, and are compiled into a
typed, canonical query object before anything runs.

DOCUMENTATION CATEGORIES

  syntax            Clause layout, literals and keywords
  paths             Aliases and how dotted paths are resolved
  constraints       WHERE conditions and their canonical order
  functions         Arithmetic, aggregates and SUBSTR
  subqueries        FROM, IN and scalar subqueries and what they expose
  types             Value types and the rules between them
  errors            Every compile error and what triggers it

QUICK REFERENCE

  SELECT c.name AS n FROM Company AS c
  WHERE c.vatNumber > 5 AND c.departments CONTAINS d
  GROUP BY 1 ORDER BY c.name

Run 'iql doc <category>' for detailed documentation.
Run 'iql check <query> --model <file>' to compile a query.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Paths) => Ok(PATHS_DOC),
        Some(DocCategory::Constraints) => Ok(CONSTRAINTS_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Subqueries) => Ok(SUBQUERIES_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Query Layout

CLAUSES
  SELECT item [AS alias], ...
  FROM source [AS alias], ...
  [WHERE constraint]
  [GROUP BY expression-or-position, ...]
  [ORDER BY expression, ...]

    Keywords are case-insensitive. Identifiers are case-sensitive.

RESERVED WORDS
    select from where as and or not contains does contain like in is null
    group order by count sum avg min max substr true false

    None of these can name a class or a FROM alias. After a dot, or as a
    SELECT alias after AS, they are ordinary names:
      select s.count, s.max as min from Stock as s

    Example:
      select c.name as n from Company as c order by c.name

SELECT ITEMS
    Every item has an alias. Without AS, a path takes its last segment
    and anything else takes a<position>_ (a1_, a2_, ...).

    Example:
      select c.name, 3 from Company as c
      Aliases: name, a2_

FROM SOURCES
    A class name, optionally qualified with the model package, or a
    parenthesised subquery with a mandatory alias. A class without AS is
    aliased by its own name.

    Example:
      from org.example.Company as c, (select ...) as sq

LITERALS
  42  -7              Integer
  1.50                Decimal (scale is kept as written)
  'text'              Text, with \' \\ \n \t \r escapes
  '2003-04-30 14:12:30.000'
                      Date-time (exact YYYY-MM-DD HH:MM:SS.mmm shape)
  true  false         Boolean

CANONICAL OUTPUT
    Compiled queries print with upper-case keywords, qualified FROM class
    names and WHERE conditions in a fixed order. Text constants print
    unquoted in the canonical form; use --iql for quoted, re-parseable
    output.
"#;

const PATHS_DOC: &str = r#"PATHS - Aliases and Field Access

RESOLUTION ORDER
    The first segment of a path is looked up in:
      1. the FROM aliases of the current query
      2. the SELECT aliases of enclosing queries, nearest first

    Example:
      select c.name as n from Company as c
      where c.name in (select d.name as dn from Department as d where d.name = n)

FIELDS
  alias.attribute          A value; nothing may follow it
  alias.reference.field    A reference rebinds to the referenced class
  alias.collection         Only valid on the left of CONTAINS

    Constraints:
      - A class name is not an alias; use FROM Company AS c, or FROM Company
      - Inherited fields are visible on subclasses

SUBQUERY COLUMNS
  sq.column                A value column of the FROM subquery sq
  sq.object.field          A field of a class column selected by sq

    Constraints:
      - sq alone is not a value
      - sq.object alone is not a value when object is a class
      - Only SELECT aliases of sq are visible, not its FROM aliases
"#;

const CONSTRAINTS_DOC: &str = r#"CONSTRAINTS - WHERE Conditions

COMPARISON
  a = b   a != b   a <> b   a < b   a <= b   a > b   a >= b
    Both sides must be comparable: numbers with numbers, text with text,
    dates with dates. Booleans allow = and != only.

LIKE
  c.name LIKE 'fish%'
    Both sides must be text.

NULL CHECKS
  e.salary IS NULL
  e.salary IS NOT NULL

CONTAINS
  c.departments CONTAINS d
  c.departments DOES NOT CONTAIN d
    The left side is a collection or reference field, the right side a
    FROM alias of a compatible class.

IN
  c.name IN (select Company.name as name from Company)
    The subquery selects exactly one column of a comparable type.

COMBINING
  a AND b      a OR b      NOT a      ( ... )
    AND binds tighter than OR.

CANONICAL ORDER
    Siblings of every AND/OR are sorted so the written order does not
    matter: CONTAINS, AND groups, OR groups, NOT, null checks, LIKE,
    comparisons, IN. Ties are broken by the condition's text. Nested
    groups of the same kind are flattened and NOT NOT cancels.

    Example:
      where c.vatNumber > 5 and c.departments contains d
      Prints: WHERE (c.departments CONTAINS d AND c.vatNumber > 5)
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Arithmetic and Aggregates

ARITHMETIC
  a + b   a - b   a * b   a / b
    Operands must be numeric. Integer with decimal gives decimal.
    An expression holds at most one operator; parenthesise operands
    to nest them, as in (a + b) * c.

AGGREGATES
  COUNT(*)            Integer
  SUM(expr)           Type of expr
  AVG(expr)           Decimal
  MIN(expr)           Type of expr
  MAX(expr)           Type of expr

    Constraints:
      - COUNT takes only *
      - The argument of SUM/AVG/MIN/MAX is a field or arithmetic
        expression, never a bare constant
      - The argument must be numeric

SUBSTR
  SUBSTR(text, start, length)
    Returns text. start and length are integers.

    Example:
      select substr('flibble', 3, max(c.vatNumber)) as e from Company as c
"#;

const SUBQUERIES_DOC: &str = r#"SUBQUERIES

FROM SUBQUERY
  from (select c, c.name as b from Company as c) as sq
    The outer query sees sq.b and sq.c.<field>. The subquery is
    resolved before the outer SELECT list.

IN SUBQUERY
  where c.name in (select d.name as n from Department as d)
    Exactly one column.

SCALAR SUBQUERY
  select (select max(c.vatNumber) as m from Company as c) as top from Company
    Exactly one column; takes that column's type.

VISIBILITY
    A subquery sees the SELECT aliases of the queries around it but none
    of their FROM aliases. Nesting is limited (32 levels by default,
    --max-depth to change).
"#;

const TYPES_DOC: &str = r#"TYPES

VALUE TYPES
  integer     Whole numbers
  decimal     Exact decimals
  text        Strings
  boolean     true / false
  datetime    Calendar instants
  class       An object of a model class (a FROM alias or reference)

RULES
    integer and decimal mix freely; the result is decimal.
    class values may be selected, grouped and ordered by, but never
    appear in arithmetic, functions or comparisons.

MODEL FILES
    Attribute types in model JSON accept: integer/int/long,
    decimal/float/double, text/string, boolean, datetime/date.
"#;

const ERRORS_DOC: &str = r#"ERRORS

  SyntaxError                 Text does not match the grammar (line:column)
  UnknownClassError           FROM names a class the model lacks
  UnknownFieldError           A path segment is not a field of its class
  PathTooLongError            A path continues past a value, or ends at a subquery
  UnknownAliasError           A path starts with a name that is not in scope
  SubqueryVisibilityError     A path reaches inside a subquery illegally
  AmbiguousOrMissingAliasError
                              A class name used where an alias is required
  ClassInExpressionError      An object used in arithmetic, functions or comparisons
  TypeMismatchError           Operand types do not fit the operator
  ArityError                  Wrong argument or column count
  InvalidAggregateArgumentError
                              An aggregate applied to a bare constant
  RecursionLimitError         Nesting deeper than the configured limit
  DuplicateAlias              Two FROM or two SELECT items share an alias
  InvalidOrdinal              GROUP BY position outside the SELECT list
"#;
