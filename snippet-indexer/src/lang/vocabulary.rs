//! Per-language node-type vocabularies.
//!
//! Each table maps concrete tree-sitter node-type names to the semantic roles
//! the extractor understands: class declarations, function declarations,
//! identifiers, parameter lists, bodies, and comments. The walk itself never
//! matches on node-type strings directly — adding a language means adding a
//! table here and a grammar registration in [`super::registry`].
//!
//! Kind names are listed tolerantly: where grammar versions drifted (for
//! example `function` vs `function_expression` in JavaScript), both spellings
//! are present. Unknown names are harmless.

use super::Language;

/// Semantic roles for one language's concrete syntax.
#[derive(Debug)]
pub struct NodeVocabulary {
    /// Node kinds that declare a class-like scope.
    pub class_decl: &'static [&'static str],
    /// Node kinds that declare a callable.
    pub function_decl: &'static [&'static str],
    /// Node kinds usable as a name.
    pub identifier: &'static [&'static str],
    /// Node kinds holding a parameter list.
    pub parameters: &'static [&'static str],
    /// Node kinds holding a class or function body.
    pub body: &'static [&'static str],
    /// Node kinds that are comments.
    pub comment: &'static [&'static str],
    /// Function forms that never carry a name. These are skipped outright:
    /// the extractor does not synthesize names from the surrounding context.
    pub anonymous_forms: &'static [&'static str],
    /// Require a body-role child before emitting a class. Suppresses C/C++
    /// forward declarations (`struct Foo;`) and bare type references.
    pub class_needs_body: bool,
    /// The language attaches documentation as a first body string
    /// (Python-style docstrings).
    pub has_docstrings: bool,
    /// Line-comment prefixes stripped when attaching comments.
    pub comment_prefixes: &'static [&'static str],
    /// Block-comment delimiters stripped when attaching comments.
    pub block_comment: Option<(&'static str, &'static str)>,
}

static PYTHON: NodeVocabulary = NodeVocabulary {
    class_decl: &["class_definition"],
    function_decl: &["function_definition", "async_function_definition"],
    identifier: &["identifier"],
    parameters: &["parameters"],
    body: &["block"],
    comment: &["comment"],
    anonymous_forms: &[],
    class_needs_body: false,
    has_docstrings: true,
    comment_prefixes: &["#"],
    block_comment: None,
};

static JAVASCRIPT: NodeVocabulary = NodeVocabulary {
    class_decl: &["class_declaration", "class"],
    function_decl: &[
        "function_declaration",
        "function_expression",
        "function",
        "generator_function_declaration",
        "generator_function",
        "arrow_function",
        "method_definition",
    ],
    identifier: &["identifier", "property_identifier"],
    parameters: &["formal_parameters"],
    body: &["statement_block", "class_body"],
    comment: &["comment"],
    anonymous_forms: &["arrow_function"],
    class_needs_body: false,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static TYPESCRIPT: NodeVocabulary = NodeVocabulary {
    class_decl: &["class_declaration", "abstract_class_declaration", "class"],
    function_decl: &[
        "function_declaration",
        "function_expression",
        "function",
        "generator_function_declaration",
        "generator_function",
        "arrow_function",
        "method_definition",
    ],
    identifier: &["identifier", "property_identifier", "type_identifier"],
    parameters: &["formal_parameters"],
    body: &["statement_block", "class_body"],
    comment: &["comment"],
    anonymous_forms: &["arrow_function"],
    class_needs_body: false,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static JAVA: NodeVocabulary = NodeVocabulary {
    class_decl: &[
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "record_declaration",
    ],
    function_decl: &["method_declaration", "constructor_declaration"],
    identifier: &["identifier"],
    parameters: &["formal_parameters"],
    body: &["class_body", "block", "constructor_body", "interface_body"],
    comment: &["line_comment", "block_comment", "comment"],
    anonymous_forms: &[],
    class_needs_body: false,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static GO: NodeVocabulary = NodeVocabulary {
    class_decl: &["type_declaration"],
    function_decl: &["function_declaration", "method_declaration"],
    identifier: &["identifier", "type_identifier", "field_identifier"],
    parameters: &["parameter_list"],
    body: &["block"],
    comment: &["comment"],
    anonymous_forms: &["func_literal"],
    class_needs_body: false,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static C: NodeVocabulary = NodeVocabulary {
    class_decl: &["struct_specifier", "union_specifier", "enum_specifier"],
    function_decl: &["function_definition"],
    identifier: &["identifier", "field_identifier", "type_identifier"],
    parameters: &["parameter_list"],
    body: &["compound_statement", "field_declaration_list", "enumerator_list"],
    comment: &["comment"],
    anonymous_forms: &[],
    class_needs_body: true,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static CPP: NodeVocabulary = NodeVocabulary {
    class_decl: &["class_specifier", "struct_specifier", "union_specifier", "enum_specifier"],
    function_decl: &["function_definition"],
    identifier: &["identifier", "field_identifier", "type_identifier"],
    parameters: &["parameter_list"],
    body: &["compound_statement", "field_declaration_list", "enumerator_list"],
    comment: &["comment"],
    anonymous_forms: &["lambda_expression"],
    class_needs_body: true,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static KOTLIN: NodeVocabulary = NodeVocabulary {
    class_decl: &["class_declaration", "object_declaration"],
    function_decl: &["function_declaration", "secondary_constructor"],
    identifier: &["simple_identifier", "identifier", "type_identifier"],
    parameters: &["function_value_parameters"],
    body: &["function_body", "class_body", "block"],
    comment: &["line_comment", "multiline_comment", "comment"],
    anonymous_forms: &["lambda_literal", "anonymous_function"],
    class_needs_body: false,
    has_docstrings: false,
    comment_prefixes: &["//"],
    block_comment: Some(("/*", "*/")),
};

static LUA: NodeVocabulary = NodeVocabulary {
    class_decl: &[],
    function_decl: &["function_declaration", "function_definition"],
    identifier: &["identifier", "name"],
    parameters: &["parameters"],
    body: &["block"],
    comment: &["comment"],
    anonymous_forms: &[],
    class_needs_body: false,
    has_docstrings: false,
    comment_prefixes: &["--"],
    block_comment: Some(("--[[", "]]")),
};

/// The vocabulary for a language. Total over [`Language`].
pub fn vocabulary_for(lang: Language) -> &'static NodeVocabulary {
    match lang {
        Language::Python => &PYTHON,
        Language::JavaScript => &JAVASCRIPT,
        // TSX differs from TypeScript only in its grammar; the node roles
        // are shared.
        Language::TypeScript | Language::Tsx => &TYPESCRIPT,
        Language::Java => &JAVA,
        Language::Go => &GO,
        Language::C => &C,
        Language::Cpp => &CPP,
        Language::Kotlin => &KOTLIN,
        Language::Lua => &LUA,
    }
}

impl NodeVocabulary {
    pub fn is_class_decl(&self, kind: &str) -> bool {
        self.class_decl.contains(&kind)
    }

    pub fn is_function_decl(&self, kind: &str) -> bool {
        self.function_decl.contains(&kind)
    }

    pub fn is_identifier(&self, kind: &str) -> bool {
        self.identifier.contains(&kind)
    }

    pub fn is_parameters(&self, kind: &str) -> bool {
        self.parameters.contains(&kind)
    }

    pub fn is_body(&self, kind: &str) -> bool {
        self.body.contains(&kind)
    }

    pub fn is_comment(&self, kind: &str) -> bool {
        self.comment.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_roles_cover_the_basics() {
        let v = vocabulary_for(Language::Python);
        assert!(v.is_class_decl("class_definition"));
        assert!(v.is_function_decl("function_definition"));
        assert!(v.is_identifier("identifier"));
        assert!(v.is_parameters("parameters"));
        assert!(v.has_docstrings);
    }

    #[test]
    fn go_classifies_type_declarations_as_classes() {
        let v = vocabulary_for(Language::Go);
        assert!(v.is_class_decl("type_declaration"));
        assert!(v.is_function_decl("function_declaration"));
        assert!(v.is_identifier("type_identifier"));
    }

    #[test]
    fn c_classes_require_a_body() {
        assert!(vocabulary_for(Language::C).class_needs_body);
        assert!(vocabulary_for(Language::Cpp).class_needs_body);
        assert!(!vocabulary_for(Language::Python).class_needs_body);
    }

    #[test]
    fn every_language_has_a_vocabulary_with_comments() {
        for lang in [
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Tsx,
            Language::Java,
            Language::Go,
            Language::C,
            Language::Cpp,
            Language::Kotlin,
            Language::Lua,
        ] {
            let v = vocabulary_for(lang);
            assert!(!v.comment.is_empty(), "{lang} has no comment kinds");
            assert!(!v.function_decl.is_empty(), "{lang} has no function kinds");
        }
    }
}
