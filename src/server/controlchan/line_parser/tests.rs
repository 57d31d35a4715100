use super::error::{ParseError, ParseErrorKind};
use crate::server::controlchan::{command::Command, line_parser::parser::parse};

use pretty_assertions::assert_eq;

#[test]
fn parse_user_cmd_crnl() {
    let input = "USER Dolores\r\n";
    assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
}

#[test]
fn parse_user_cmd_mixed_case() {
    let input = "uSeR Dolores\r\n";
    assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
}

#[test]
fn parse_user_lowercase() {
    let input = "user Dolores\r\n";
    assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
}

#[test]
// Not all clients include the (actually mandatory) '\r'
fn parse_user_cmd_nl() {
    let input = "USER Dolores\n";
    assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
}

#[test]
// Although we accept requests ending in only '\n', we won't accept requests ending only in '\r'
fn parse_user_cmd_cr() {
    let input = "USER Dolores\r";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidEol)));
}

#[test]
// We should fail if the request does not end in '\n' or '\r'
fn parse_user_cmd_no_eol() {
    let input = "USER Dolores";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidEol)));
}

#[test]
fn parse_stray_cr() {
    let input = "USER Dol\rores\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidEol)));
}

#[test]
// The whole run of blanks after the verb separates it from the argument.
fn parse_user_cmd_double_space() {
    let input = "USER  \tDolores\r\n";
    assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
}

#[test]
fn parse_user_cmd_whitespace() {
    let input = "USER Dolores  Abernathy\r\n";
    assert_eq!(
        parse(input).unwrap(),
        Command::User {
            username: "Dolores  Abernathy".into()
        }
    );
}

#[test]
fn parse_pass_cmd_crnl() {
    let input = "PASS s3cr3t\r\n";
    assert_eq!(parse(input).unwrap(), Command::Pass);
}

#[test]
fn parse_pass_cmd_whitespace() {
    let input = "PASS s3cr#t p@S$w0rd\r\n";
    assert_eq!(parse(input).unwrap(), Command::Pass);
    assert!(!format!("{:?}", parse(input).unwrap()).contains("p@S$w0rd"));
}

#[test]
fn parse_invalid_utf8() {
    let input: &'static [u8] = b"USER \xff\xfe\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidUtf8)));
}

#[test]
fn parse_help() {
    let input = "HELP\r\n";
    assert_eq!(parse(input).unwrap(), Command::Help);

    let input = "HELP bla\r\n";
    assert_eq!(parse(input).unwrap(), Command::Help);
}

#[test]
fn parse_noop() {
    let input = "NOOP\r\n";
    assert_eq!(parse(input).unwrap(), Command::Noop);

    let input = "NOOP bla\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
}

#[test]
fn parse_syst_and_type() {
    assert_eq!(parse("SYST\r\n"), Ok(Command::Syst));
    assert_eq!(parse("TYPE I\r\n"), Ok(Command::Type));
    assert_eq!(parse("type a\r\n"), Ok(Command::Type));
}

#[test]
fn parse_port() {
    let input = "PORT\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidCommand)));

    let input = "PORT 127,0,0,1,4,1\r\n";
    assert_eq!(
        parse(input).unwrap(),
        Command::Port {
            addr: "127,0,0,1,4,1".into()
        }
    );
}

#[test]
fn parse_list() {
    struct Test {
        input: &'static str,
        expected_options: Option<&'static str>,
        expected_path: Option<&'static str>,
    }

    let tests = [
        Test {
            input: "LIST\r\n",
            expected_options: None,
            expected_path: None,
        },
        Test {
            input: "LIST tmp\r\n",
            expected_options: None,
            expected_path: Some("tmp"),
        },
        Test {
            input: "LIST -la\r\n",
            expected_options: Some("-la"),
            expected_path: None,
        },
        Test {
            input: "LIST -la tmp\r\n",
            expected_options: Some("-la"),
            expected_path: Some("tmp"),
        },
        Test {
            input: "LIST -la -x tmp\r\n",
            expected_options: Some("-la -x"),
            expected_path: Some("tmp"),
        },
        Test {
            input: "list -la  -x tmp*\r\n",
            expected_options: Some("-la -x"),
            expected_path: Some("tmp*"),
        },
    ];

    for test in tests.iter() {
        assert_eq!(
            parse(test.input),
            Ok(Command::List {
                options: test.expected_options.map(|s| s.to_string()),
                path: test.expected_path.map(|s| s.to_string()),
            })
        );
    }
}

#[test]
fn parse_pwd() {
    let input = "PWD\r\n";
    assert_eq!(parse(input), Ok(Command::Pwd));

    let input = "PWD bla\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
}

#[test]
fn parse_cwd() {
    let input = "CWD\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidCommand)));

    let input = "CWD /tmp\r\n";
    assert_eq!(parse(input), Ok(Command::Cwd { path: "/tmp".into() }));

    let input = "cwd my documents\r\n";
    assert_eq!(parse(input), Ok(Command::Cwd { path: "my documents".into() }));
}

#[test]
fn parse_retr() {
    let input = "RETR\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidCommand)));

    let input = "RETR some file.txt\r\n";
    assert_eq!(parse(input), Ok(Command::Retr { path: "some file.txt".into() }));
}

#[test]
fn parse_quit() {
    let input = "QUIT\r\n";
    assert_eq!(parse(input), Ok(Command::Quit));

    let input = "QUIT NOW\r\n";
    assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
}

#[test]
fn parse_unknown_verb() {
    let input = "bla something else\r\n";
    assert_eq!(
        parse(input),
        Ok(Command::Other {
            command_name: "BLA".into(),
            arguments: "something else".into(),
        })
    );
}

#[test]
fn parse_empty_line() {
    assert_eq!(
        parse("\r\n"),
        Ok(Command::Other {
            command_name: "".into(),
            arguments: "".into(),
        })
    );
}
