//! C++ source writer
//!
//! Trees are written depth-first straight into the output stream. Each
//! directory becomes a braced initializer list of `{name, value}` pairs, the
//! form accepted by the runtime's `FileEntry` constructors.

use std::io::Write;

use crate::escape::{escape_name, escape_text_literal, EscapeStyle};
use crate::node::Node;

/// Spaces per nesting level
const INDENT: usize = 4;

/// Incremental writer for one generated source file
pub struct Emitter<W: Write> {
    out: W,
    style: EscapeStyle,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, style: EscapeStyle) -> Self {
        Self { out, style }
    }

    /// Banner and the include providing `FileEntry`.
    ///
    /// An include beginning with `<` is written verbatim, anything else is
    /// quoted.
    pub fn write_prelude(&mut self, include: &str) -> std::io::Result<()> {
        writeln!(self.out, "// GENERATED FILE - DO NOT EDIT")?;
        writeln!(self.out, "// Generator: pack-standalone")?;
        writeln!(self.out)?;
        if include.starts_with('<') {
            writeln!(self.out, "#include {}", include)?;
        } else {
            writeln!(self.out, "#include \"{}\"", include)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// `FileEntry <symbol>({...});` for a whole tree
    pub fn write_tree_decl(&mut self, symbol: &str, tree: &Node) -> std::io::Result<()> {
        write!(self.out, "FileEntry {}(", symbol)?;
        self.write_node_value(tree, 1)?;
        writeln!(self.out, ");")?;
        writeln!(self.out)?;
        Ok(())
    }

    /// `std::string <symbol> = "...";` for a single script
    pub fn write_text_decl(&mut self, symbol: &str, text: &str) -> std::io::Result<()> {
        writeln!(
            self.out,
            "std::string {} = {};",
            symbol,
            escape_text_literal(text, self.style)
        )
    }

    /// Write a directory's braced list at `level`.
    ///
    /// Children are indented `level` steps and the closing brace
    /// `level - 1` steps. An empty directory still gets both braces.
    pub fn write_directory(&mut self, children: &[Node], level: usize) -> std::io::Result<()> {
        writeln!(self.out, "{{")?;
        for child in children {
            write!(
                self.out,
                "{:indent$}{{{}, ",
                "",
                escape_name(child.name()),
                indent = level * INDENT
            )?;
            self.write_node_value(child, level + 1)?;
            writeln!(self.out, "}},")?;
        }
        write!(
            self.out,
            "{:indent$}}}",
            "",
            indent = level.saturating_sub(1) * INDENT
        )
    }

    fn write_node_value(&mut self, node: &Node, level: usize) -> std::io::Result<()> {
        match node {
            Node::Dir { children, .. } => self.write_directory(children, level),
            Node::File { contents, .. } => {
                self.out
                    .write_all(escape_text_literal(contents, self.style).as_bytes())
            }
        }
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_tree(tree: &Node, style: EscapeStyle) -> String {
        let mut emitter = Emitter::new(Vec::new(), style);
        emitter.write_tree_decl("standaloneROM", tree).unwrap();
        String::from_utf8(emitter.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_file_and_empty_dir_layout() {
        let tree = Node::dir(
            "rom",
            vec![Node::file("a.txt", "hi\n"), Node::dir("sub", vec![])],
        );
        let text = render_tree(&tree, EscapeStyle::Continuation);
        assert_eq!(
            text,
            "FileEntry standaloneROM({\n    {\"a.txt\", \"hi\\n\\\n\"},\n    {\"sub\", {\n    }},\n});\n\n"
        );
    }

    #[test]
    fn test_empty_tree_keeps_braces() {
        let text = render_tree(&Node::dir("debug", vec![]), EscapeStyle::Continuation);
        assert_eq!(text, "FileEntry standaloneROM({\n});\n\n");
    }

    #[test]
    fn test_nested_indentation() {
        let tree = Node::dir(
            "rom",
            vec![Node::dir("a", vec![Node::dir("b", vec![Node::file("c", "")])])],
        );
        let text = render_tree(&tree, EscapeStyle::Concatenation);
        let expected = concat!(
            "FileEntry standaloneROM({\n",
            "    {\"a\", {\n",
            "        {\"b\", {\n",
            "            {\"c\", \"\"},\n",
            "        }},\n",
            "    }},\n",
            "});\n\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_prelude_include_forms() {
        let mut emitter = Emitter::new(Vec::new(), EscapeStyle::Continuation);
        emitter.write_prelude("fs_standalone.hpp").unwrap();
        emitter.write_prelude("<FileEntry.hpp>").unwrap();
        let text = String::from_utf8(emitter.finish().unwrap()).unwrap();
        assert!(text.starts_with("// GENERATED FILE - DO NOT EDIT\n"));
        assert!(text.contains("#include \"fs_standalone.hpp\"\n"));
        assert!(text.contains("#include <FileEntry.hpp>\n"));
    }

    #[test]
    fn test_text_decl() {
        let mut emitter = Emitter::new(Vec::new(), EscapeStyle::Concatenation);
        emitter.write_text_decl("standaloneBIOS", "print(\"a\")\n").unwrap();
        let text = String::from_utf8(emitter.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "std::string standaloneBIOS = \"print(\\\"a\\\")\\n\"\n\"\";\n"
        );
    }

    #[test]
    fn test_names_are_escaped() {
        let tree = Node::dir("rom", vec![Node::file("we\"ird", "")]);
        let text = render_tree(&tree, EscapeStyle::Continuation);
        assert!(text.contains("{\"we\\\"ird\", \"\"},"));
    }
}
