use ratatui::style::Modifier;
use ratatui::style::Style;
use test_utils::inline_markdown_fixture;
use test_utils::transcript_fixture;

use super::*;
use crate::domain::models::Theme;
use crate::domain::services::Themes;

fn lines_to_string(text: &str) -> String {
    let palette = Themes::get(Theme::Auto);
    return to_lines(text, Style::default(), &palette)
        .iter()
        .map(|line| {
            return line
                .spans
                .iter()
                .map(|span| return span.content.to_string())
                .collect::<String>();
        })
        .collect::<Vec<String>>()
        .join("\n");
}

mod parse_inline {
    use super::*;

    #[test]
    fn it_parses_every_marker() {
        let res = parse_inline("File **Form I-485** and keep a *copy* of `receipt.pdf`");

        assert_eq!(
            res,
            vec![
                Inline::Text("File ".to_string()),
                Inline::Strong("Form I-485".to_string()),
                Inline::Text(" and keep a ".to_string()),
                Inline::Emphasis("copy".to_string()),
                Inline::Text(" of ".to_string()),
                Inline::Code("receipt.pdf".to_string()),
            ]
        );
    }

    #[test]
    fn it_keeps_unclosed_markers_literal() {
        let res = parse_inline("Fees are 2 * 3 and `pending");

        assert_eq!(
            res,
            vec![Inline::Text("Fees are 2 * 3 and `pending".to_string())]
        );
    }

    #[test]
    fn it_ignores_empty_markers() {
        assert_eq!(
            parse_inline("a ** b"),
            vec![Inline::Text("a ** b".to_string())]
        );
    }
}

mod parse {
    use super::*;

    #[test]
    fn it_parses_blocks() {
        let res = parse(inline_markdown_fixture());

        assert_eq!(res.len(), 2);
        assert_eq!(
            res[0],
            Block::Heading(1, vec![Inline::Text("Next steps".to_string())])
        );
        assert!(matches!(&res[1], Block::Paragraph(lines) if lines.len() == 1));
    }

    #[test]
    fn it_groups_list_items() {
        let res = parse("- one\n- two\n1. first\n2. second\n\nAfter");

        assert_eq!(
            res,
            vec![
                Block::List {
                    ordered: false,
                    items: vec![
                        vec![Inline::Text("one".to_string())],
                        vec![Inline::Text("two".to_string())],
                    ],
                },
                Block::List {
                    ordered: true,
                    items: vec![
                        vec![Inline::Text("first".to_string())],
                        vec![Inline::Text("second".to_string())],
                    ],
                },
                Block::Paragraph(vec![vec![Inline::Text("After".to_string())]]),
            ]
        );
    }

    #[test]
    fn it_only_supports_three_heading_levels() {
        let res = parse("### Three\n#### Four\n#NoSpace");

        assert_eq!(
            res[0],
            Block::Heading(3, vec![Inline::Text("Three".to_string())])
        );
        assert_eq!(
            res[1],
            Block::Paragraph(vec![
                vec![Inline::Text("#### Four".to_string())],
                vec![Inline::Text("#NoSpace".to_string())],
            ])
        );
    }
}

mod to_html {
    use super::*;

    #[test]
    fn it_renders_html() {
        insta::assert_snapshot!(to_html(inline_markdown_fixture()), @r###"
        <h1>Next steps</h1>
        <p>File <strong>Form I-485</strong> and keep a <em>copy</em> of <code>receipt.pdf</code></p>
        "###);
    }

    #[test]
    fn it_escapes_before_adding_markup() {
        let res = to_html("<script>alert('x')</script> & **\"bold\"**");

        assert_eq!(
            res,
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; <strong>&quot;bold&quot;</strong></p>"
        );
    }

    #[test]
    fn it_escapes_code_spans() {
        assert_eq!(to_html("`<b>`"), "<p><code>&lt;b&gt;</code></p>");
    }

    #[test]
    fn it_renders_line_breaks_and_lists() {
        assert_eq!(
            to_html("Line one\nLine two\n\n1. a\n2. b"),
            "<p>Line one<br>Line two</p>\n<ol><li>a</li><li>b</li></ol>"
        );
    }
}

mod to_lines {
    use super::*;

    #[test]
    fn it_renders_terminal_lines() {
        insta::assert_snapshot!(lines_to_string(transcript_fixture()), @r###"
        Human: What documents do I need for an H-1B visa?

        AI: ## H-1B checklist

        You will usually need:

        • A valid passport
        • Form I-129 filed by your employer
        • Proof of a specialty occupation degree

        1. Employer files the LCA
        2. Employer files the petition

        Human: How long does processing take?

        AI: Regular processing takes 2 to 6 months.
        "###);
    }

    #[test]
    fn it_styles_inline_runs() {
        let palette = Themes::get(Theme::Auto);
        let lines = to_lines("**Bold** *it* `code`", Style::default(), &palette);

        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));
        assert_eq!(spans[4].style, palette.code);
    }
}
