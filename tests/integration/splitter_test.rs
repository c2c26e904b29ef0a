//! Statement splitter integration tests.
//!
//! Exercises the splitter over realistic multi-statement scripts.

use pretty_assertions::assert_eq;
use sqldesk::splitter::{split, tokenize, Token};

fn texts(input: &str) -> Vec<String> {
    split(input).iter().map(|s| s.text().to_string()).collect()
}

#[test]
fn test_lossless_partition_over_script() {
    let script = "\
-- seed data
insert into users (name, bio) values ('Alice', 'likes ''quotes''; and semicolons');
insert into users (name, bio) values ('Bob', null); /* bulk
load; done */
select count(*) from users;";

    let rebuilt: String = tokenize(script).iter().map(Token::span).collect();
    assert_eq!(rebuilt, script);
}

#[test]
fn test_realistic_script_statement_count() {
    let script = "\
create table t (id int, note text);
insert into t values (1, 'a;b');
-- a comment; with a separator
update t set note = 'it''s fine' where id = 1;
/* multi
   line; comment */
select * from t;
";
    let statements = texts(script);
    assert_eq!(
        statements,
        vec![
            "create table t (id int, note text)",
            "insert into t values (1, 'a;b')",
            "update t set note = 'it''s fine' where id = 1",
            "select * from t",
        ]
    );
}

#[test]
fn test_separator_inside_string_literal() {
    assert_eq!(texts("select ';' ; select 1"), vec!["select ';'", "select 1"]);
}

#[test]
fn test_escaped_quote_kept_verbatim() {
    let statements = texts("select 'a''b'; select 2");
    assert_eq!(statements.len(), 2);
    assert!(statements[0].contains("'a''b'"));
}

#[test]
fn test_comment_semicolons_are_not_separators() {
    assert_eq!(
        texts("select 1; -- comment ; not a stmt\nselect 2;"),
        vec!["select 1", "select 2"]
    );
    assert_eq!(texts("select 1 /* a; b */; select 2;").len(), 2);
}

#[test]
fn test_consecutive_separators_yield_nothing() {
    assert_eq!(texts(";; select 1 ;; ;"), vec!["select 1"]);
    assert!(texts(";;;").is_empty());
}

#[test]
fn test_resplit_of_rejoined_statements_is_stable() {
    let script = "select ';'; select 'a''b' /* x; y */; select 3";
    let first = texts(script);
    let rejoined = first.join(";");
    let second = texts(&rejoined);
    assert_eq!(first, second);
}

#[test]
fn test_splitter_is_total_over_malformed_input() {
    // None of these may panic, and each absorbs the malformed tail.
    assert_eq!(texts("select 'unterminated"), vec!["select 'unterminated"]);
    assert_eq!(texts("select 1 /* no close"), vec!["select 1 /* no close"]);
    assert_eq!(texts("-- only a comment"), Vec::<String>::new());
    assert_eq!(texts(""), Vec::<String>::new());
}

#[test]
fn test_offsets_point_into_original_input() {
    let input = "select 1;\n  select 'x;y';\nselect 3";
    for statement in split(input) {
        assert!(input[statement.offset()..].starts_with(statement.text()));
    }
}
