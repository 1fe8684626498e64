use argtree::{
    Argument, CommandLine, ParseError, Parser, Registration, RegistrationError, Report, Severity,
};

fn line(args: &[&str]) -> CommandLine {
    CommandLine::new(args.iter().copied())
}

#[test]
fn flag_and_string_option_leave_unbound_tokens() {
    let foo = Argument::flag("foo").short("f");
    let bar = Argument::string("bar", "");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();
    parser.add_argument(&bar).unwrap();

    let mut report = Report::new();
    parser
        .parse(&line(&["-f", "--bar", "baz", "unbound"]), &mut report)
        .unwrap();

    assert!(foo.value_boolean());
    assert_eq!(bar.value_string(), "baz");
    assert_eq!(parser.argc(), 4);
    assert_eq!(parser.remaining().as_slice(), ["unbound"]);
    assert!(report.is_empty(), "unexpected diagnostics:\n{report}");
}

#[test]
fn split_value_and_equals_value_are_equivalent() {
    for args in [&["--foo", "v"][..], &["--foo=v"][..]] {
        let foo = Argument::string("foo", "");
        let mut parser = Parser::new();
        parser.add_argument(&foo).unwrap();

        let mut report = Report::new();
        parser.parse(&line(args), &mut report).unwrap();
        assert_eq!(foo.value_string(), "v", "{args:?}");
        assert_eq!(parser.remaining_argc(), 0, "{args:?}");
    }

    for args in [&["--foo", "-0x1A"][..], &["--foo=-0x1A"][..]] {
        let foo = Argument::integer("foo", 0);
        let mut parser = Parser::new();
        parser.add_argument(&foo).unwrap();

        let mut report = Report::new();
        parser.parse(&line(args), &mut report).unwrap();
        assert_eq!(foo.value_integer(), -26, "{args:?}");
        assert_eq!(parser.remaining_argc(), 0, "{args:?}");
    }

    for args in [&["--foo", "False"][..], &["--foo=False"][..]] {
        let foo = Argument::boolean("foo", true);
        let mut parser = Parser::new();
        parser.add_argument(&foo).unwrap();

        let mut report = Report::new();
        parser.parse(&line(args), &mut report).unwrap();
        assert!(!foo.value_boolean(), "{args:?}");
        assert!(foo.is_set(), "{args:?}");
        assert_eq!(parser.remaining_argc(), 0, "{args:?}");
    }
}

#[test]
fn equals_value_may_contain_equals_and_be_empty() {
    let foo = Argument::string("foo", "x");
    let bar = Argument::string("bar", "x");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();
    parser.add_argument(&bar).unwrap();

    let mut report = Report::new();
    parser
        .parse(&line(&["--foo=a=b", "--bar="]), &mut report)
        .unwrap();
    assert_eq!(foo.value_string(), "a=b");
    assert!(bar.is_set());
    assert_eq!(bar.value_string(), "");
}

#[test]
fn choice_accepts_listed_values() {
    let foo = Argument::choice("foo", ["bar", "baz"], "bar");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();

    let mut report = Report::new();
    parser.parse(&line(&["--foo", "baz"]), &mut report).unwrap();
    assert_eq!(foo.value_string(), "baz");

    let err = parser
        .parse(&line(&["--foo", "qux"]), &mut report)
        .unwrap_err();
    assert!(matches!(err, ParseError::InvalidChoice { .. }));
    assert!(!foo.is_set());
    assert_eq!(foo.value_string(), "bar");
    assert!(report.has_errors());
}

#[test]
fn repeated_integer_collects_in_order() {
    let foo = Argument::repeated(Argument::integer("foo", 0).short("f"));
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();

    let mut report = Report::new();
    parser
        .parse(&line(&["--foo", "1", "-f2", "x", "--foo=0x10"]), &mut report)
        .unwrap();

    assert!(foo.is_set());
    let values: Vec<i64> = foo.values().iter().map(Argument::value_integer).collect();
    assert_eq!(values, [1, 2, 16]);
    assert_eq!(foo.value_array(1).value_string(), "2");
    assert_eq!(parser.remaining().as_slice(), ["x"]);
}

#[test]
fn repeated_element_error_keeps_earlier_elements() {
    let foo = Argument::repeated(Argument::range("foo", 0, 9, 0));
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();

    let mut report = Report::new();
    let err = parser
        .parse(&line(&["--foo", "1", "--foo", "10"]), &mut report)
        .unwrap_err();
    assert!(matches!(err, ParseError::OutOfRange { .. }));
    assert_eq!(foo.array_size(), 1);
    assert_eq!(foo.value_array(0).value_integer(), 1);
}

#[test]
fn single_valued_option_given_twice_is_an_error() {
    let foo = Argument::integer("foo", 0).short("a");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();

    let mut report = Report::new();
    let err = parser
        .parse(&line(&["-a", "10", "--foo=20"]), &mut report)
        .unwrap_err();
    assert_eq!(err, ParseError::Repeated("foo".into()));
    assert_eq!(foo.value_integer(), 10);
    assert_eq!(
        report.to_string(),
        "Error: Option 'foo' cannot be specified more than once.\n"
    );
}

#[test]
fn integer_options_with_short_names() {
    let foo = Argument::integer("foo", 0).short("a");
    let bar = Argument::integer("bar", 0).short("b");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();
    parser.add_argument(&bar).unwrap();

    let mut report = Report::new();
    parser
        .parse(&line(&["-a", "10", "-b", "20"]), &mut report)
        .unwrap();
    assert!(foo.is_set() && bar.is_set());
    assert_eq!(foo.value_integer(), 10);
    assert_eq!(bar.value_integer(), 20);
}

#[test]
fn integer_error_messages() {
    let cases = [
        (
            "123abc",
            "Argument for integer option 'foo' contains invalid characters: 'abc'.",
        ),
        ("bar", "Failed to parse argument for integer option 'foo': 'bar'."),
        (
            "99999999999999999999",
            "Argument for integer option 'foo' is out of range: '99999999999999999999'.",
        ),
    ];
    for (value, message) in cases {
        let foo = Argument::integer("foo", 0);
        let mut parser = Parser::new();
        parser.add_argument(&foo).unwrap();

        let mut report = Report::new();
        assert!(parser.parse(&line(&["--foo", value]), &mut report).is_err());
        assert_eq!(report.to_string(), format!("Error: {message}\n"));
        assert!(!foo.is_set());
    }
}

#[test]
fn reparse_is_idempotent() {
    let foo = Argument::flag("foo").short("f");
    let bar = Argument::repeated(Argument::string("bar", ""));
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();
    parser.add_argument(&bar).unwrap();

    let command_line = line(&["-f", "--bar", "a", "x", "--bar=b"]);
    for _ in 0..2 {
        let mut report = Report::new();
        parser.parse(&command_line, &mut report).unwrap();
        assert!(foo.is_set());
        assert_eq!(bar.array_size(), 2);
        assert_eq!(parser.remaining().as_slice(), ["x"]);
        assert!(report.is_empty(), "unexpected diagnostics:\n{report}");
    }
}

#[test]
fn flag_cluster_with_unknown_characters() {
    let a = Argument::flag("alpha").short("a");
    let mut parser = Parser::new();
    parser.add_argument(&a).unwrap();

    let mut report = Report::new();
    let err = parser.parse(&line(&["-aqz"]), &mut report).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The command line contains invalid flags 'qz'."
    );
    assert_eq!(
        report.iter().map(|d| d.severity).collect::<Vec<_>>(),
        [Severity::Error]
    );
}

#[test]
fn multibyte_short_flags() {
    let alef = Argument::flag("alef").short("\u{05d0}");
    let bet = Argument::flag("bet").short("\u{05d1}");
    let gimel = Argument::flag("gimel").short("\u{05d2}");
    let mut parser = Parser::new();
    parser.add_argument(&alef).unwrap();
    parser.add_argument(&bet).unwrap();
    parser.add_argument(&gimel).unwrap();

    let mut report = Report::new();
    parser
        .parse(&CommandLine::split("-\u{05d0}\u{05d2} rest"), &mut report)
        .unwrap();
    assert!(alef.is_set() && gimel.is_set());
    assert!(!bet.is_set());
    assert_eq!(parser.remaining().as_slice(), ["rest"]);
}

#[test]
fn duplicate_flags_only_warn() {
    let foo = Argument::flag("foo").short("f");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();

    let mut report = Report::new();
    parser.parse(&line(&["-f", "-f"]), &mut report).unwrap();
    assert!(foo.is_set());
    assert!(!report.is_empty());
    assert!(!report.has_errors());
    assert_eq!(report.warnings().count(), 1);
}

#[test]
fn terminator_leaves_following_tokens_unbound() {
    let foo = Argument::flag("foo");
    let bar = Argument::flag("bar");
    let mut parser = Parser::new();
    parser.add_argument(&foo).unwrap();
    parser.add_argument(&bar).unwrap();

    let mut report = Report::new();
    parser
        .parse(&line(&["--foo", "--", "--bar"]), &mut report)
        .unwrap();
    assert!(foo.is_set());
    assert!(!bar.is_set());
    assert_eq!(parser.argc(), 3);
    assert_eq!(parser.remaining().as_slice(), ["--bar"]);
}

#[test]
fn skipped_arguments_stay_in_place() {
    let two = Argument::flag("two");
    let mut parser = Parser::new();
    parser.add_argument(&two).unwrap();

    let mut report = Report::new();
    parser
        .parse(&line(&["one", "--two", "three"]), &mut report)
        .unwrap();
    assert_eq!(parser.remaining().as_slice(), ["one", "three"]);
}

#[test]
fn registration_errors() {
    let flag = Argument::flag("flag");
    let same_name = Argument::flag("flag");
    let f1 = Argument::flag("flag1").short("f");
    let f2 = Argument::flag("flag2").short("f");
    let equals = Argument::flag("fl=ag");

    let mut parser = Parser::new();
    assert_eq!(parser.add_argument(&flag), Ok(Registration::Added));
    assert_eq!(parser.add_argument(&flag), Ok(Registration::AlreadyAdded));
    assert_eq!(
        parser.add_argument(&same_name),
        Err(RegistrationError::DuplicateName("flag".into()))
    );
    assert_eq!(parser.add_argument(&f1), Ok(Registration::Added));
    assert!(matches!(
        parser.add_argument(&f2),
        Err(RegistrationError::ShortNameConflict { .. })
    ));
    assert_eq!(
        parser.add_argument(&equals).unwrap_err().to_string(),
        "Argument name 'fl=ag' contains invalid character '='."
    );
    assert_eq!(parser.len(), 2);
}

#[test]
fn boolean_and_range_options_from_split_line() {
    let dry_run = Argument::boolean("dry-run", true).short("n");
    let jobs = Argument::range_choices("jobs", [1, 2, 4, 8], 1).short("j");
    let mut parser = Parser::new();
    parser.add_argument(&dry_run).unwrap();
    parser.add_argument(&jobs).unwrap();

    let mut report = Report::new();
    parser
        .parse(&CommandLine::split(r#"-n0 -j 4 "a file""#), &mut report)
        .unwrap();
    assert!(!dry_run.value_boolean());
    assert_eq!(jobs.value_integer(), 4);
    assert_eq!(parser.remaining().as_slice(), ["a file"]);
}
