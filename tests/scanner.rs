#[cfg(test)]
mod scanner_tests {
    use hi_interpreter as hi;

    use hi::error::HiError;
    use hi::scanner::*;
    use hi::token::*;
    use pretty_assertions::assert_eq;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn rendered(source: &str) -> Vec<String> {
        scan_tokens(source)
            .expect("source should scan")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})[]",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACKET, "["),
                (TokenType::RIGHT_BRACKET, "]"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_token_sequence(
            "and class else nahh fun for if nada or print return super self yerr var while",
            &[
                (TokenType::AND, "and"),
                (TokenType::CLASS, "class"),
                (TokenType::ELSE, "else"),
                (TokenType::NAHH, "nahh"),
                (TokenType::FUN, "fun"),
                (TokenType::FOR, "for"),
                (TokenType::IF, "if"),
                (TokenType::NADA, "nada"),
                (TokenType::OR, "or"),
                (TokenType::PRINT, "print"),
                (TokenType::RETURN, "return"),
                (TokenType::SUPER, "super"),
                (TokenType::SELF, "self"),
                (TokenType::YERR, "yerr"),
                (TokenType::VAR, "var"),
                (TokenType::WHILE, "while"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_identifiers_are_not_keywords() {
        assert_token_sequence(
            "yerrr _nada classy true false nil",
            &[
                (TokenType::IDENTIFIER, "yerrr"),
                (TokenType::IDENTIFIER, "_nada"),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::IDENTIFIER, "true"),
                (TokenType::IDENTIFIER, "false"),
                (TokenType::IDENTIFIER, "nil"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_05_literals_render_with_values() {
        assert_eq!(
            rendered(r#"42 3.14 "hi there" 7."#),
            vec![
                "NUMBER 42 42.0".to_string(),
                "NUMBER 3.14 3.14".to_string(),
                "STRING \"hi there\" hi there".to_string(),
                "NUMBER 7 7.0".to_string(),
                "DOT . null".to_string(),
                "EOF  null".to_string(),
            ]
        );
    }

    #[test]
    fn test_scanner_06_comments_and_lines() {
        let tokens = scan_tokens("// header\nvar a; // trailing\n\nprint a;").unwrap();

        let lines: Vec<(String, usize)> = tokens
            .iter()
            .map(|t| (t.lexeme.clone(), t.line))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("var".to_string(), 2),
                ("a".to_string(), 2),
                (";".to_string(), 2),
                ("print".to_string(), 4),
                ("a".to_string(), 4),
                (";".to_string(), 4),
                ("".to_string(), 4),
            ]
        );
    }

    #[test]
    fn test_scanner_07_multiline_string_counts_lines() {
        let tokens = scan_tokens("\"one\ntwo\" x").unwrap();

        assert_eq!(tokens[0].token_type, TokenType::STRING(String::new()));
        assert!(matches!(&tokens[0].token_type, TokenType::STRING(s) if s == "one\ntwo"));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_08_unexpected_character_stops_scanning() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        // COMMA, DOT, then the error; nothing after it.
        assert_eq!(results.len(), 3);
        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");

        match &results[2] {
            Err(HiError::Lex { message, line }) => {
                assert_eq!(message, "Unexpected character: $");
                assert_eq!(*line, 1);
            }
            other => panic!("expected a lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_scanner_09_unterminated_string() {
        let err = scan_tokens("print \"oops\n").unwrap_err();

        assert_eq!(err.to_string(), "[line 2] Error: Unterminated string.");
    }

    #[test]
    fn test_scanner_10_empty_source_is_just_eof() {
        assert_token_sequence("", &[(TokenType::EOF, "")]);
        assert_token_sequence("   \t\r\n // nothing", &[(TokenType::EOF, "")]);
    }

    #[test]
    fn test_scanner_11_tokens_serialize_to_json() {
        let tokens = scan_tokens("var x = 1;").unwrap();
        let json = serde_json::to_value(&tokens).unwrap();

        assert_eq!(json[0]["lexeme"], "var");
        assert_eq!(json[0]["token_type"], "VAR");
        assert_eq!(json[3]["token_type"]["NUMBER"], 1.0);
        assert_eq!(json[3]["line"], 1);
    }

    // Helper function
    fn assert_token_matches(
        result: &Result<Token, HiError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(
                    token.token_type, expected_type,
                    "Expected token type {:?}, got {:?}",
                    expected_type, token.token_type
                );
                assert_eq!(
                    token.lexeme, expected_lexeme,
                    "Expected lexeme '{}', got '{}'",
                    expected_lexeme, token.lexeme
                );
            }
            Err(e) => panic!("Expected token but got error: {}", e),
        }
    }
}
