/// The template syntax configuration.
///
/// Use [`Syntax::default()`] to get the default syntax configuration and
/// [`Syntax::builder()`] to create a custom syntax configuration.
///
/// A tag is formed from three parts: the open bracket, the delimiter and the
/// close bracket. With the defaults `<`, `%` and `>` this gives the familiar
/// `<% ... %>` family of tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub(crate) patterns: Vec<(Kind, String)>,
    pub(crate) open_tag: String,
    pub(crate) close_tag: String,
}

/// A builder for the syntax configuration.
///
/// This struct is typically created using [`Syntax::builder()`].
#[derive(Debug, Clone)]
pub struct SyntaxBuilder<'a> {
    open: &'a str,
    close: &'a str,
    delimiter: &'a str,
    alt_escape_sign: bool,
}

/// Every delimiter variant recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `<%`
    OpenEval,
    /// `<%_`
    OpenEvalTrim,
    /// `<%=`
    OpenEscaped,
    /// `<%-`
    OpenRaw,
    /// `<%#`
    OpenComment,
    /// `<%%`
    OpenLiteral,
    /// `%>`
    Close,
    /// `-%>`
    CloseDashTrim,
    /// `_%>`
    CloseUnderscoreTrim,
    /// `%%>`
    CloseLiteral,
}

impl Default for Syntax {
    /// Returns the default syntax configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use scriptlet::Syntax;
    ///
    /// let syntax = Syntax::builder()
    ///     .open("<")
    ///     .close(">")
    ///     .delimiter("%")
    ///     .build();
    /// assert_eq!(syntax, Syntax::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Syntax::builder().build()
    }
}

impl Syntax {
    /// Create a new syntax builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let syntax = scriptlet::Syntax::builder()
    ///     .open("{")
    ///     .close("}")
    ///     .delimiter("?")
    ///     .build();
    /// ```
    #[inline]
    pub fn builder<'a>() -> SyntaxBuilder<'a> {
        SyntaxBuilder::new()
    }

    /// The plain open tag, e.g. `<%`.
    pub fn open_tag(&self) -> &str {
        &self.open_tag
    }

    /// The plain close tag, e.g. `%>`.
    pub fn close_tag(&self) -> &str {
        &self.close_tag
    }

    /// Returns the text of the given delimiter variant.
    pub(crate) fn pattern(&self, kind: Kind) -> &str {
        self.patterns
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_str())
            .unwrap_or_default()
    }
}

impl<'a> SyntaxBuilder<'a> {
    /// Creates a new syntax builder with the default `<`, `%`, `>` parts.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            open: "<",
            close: ">",
            delimiter: "%",
            alt_escape_sign: false,
        }
    }

    /// Set the open bracket.
    ///
    /// # Panics
    ///
    /// If the string is empty.
    #[inline]
    pub fn open(&mut self, open: &'a str) -> &mut Self {
        assert!(!open.is_empty());
        self.open = open;
        self
    }

    /// Set the close bracket.
    ///
    /// # Panics
    ///
    /// If the string is empty.
    #[inline]
    pub fn close(&mut self, close: &'a str) -> &mut Self {
        assert!(!close.is_empty());
        self.close = close;
        self
    }

    /// Set the delimiter that sits between the brackets and the tag body.
    ///
    /// # Panics
    ///
    /// If the string is empty.
    #[inline]
    pub fn delimiter(&mut self, delimiter: &'a str) -> &mut Self {
        assert!(!delimiter.is_empty());
        self.delimiter = delimiter;
        self
    }

    /// Swap the escaped and raw output signs.
    ///
    /// When enabled `<%-` outputs an escaped value and `<%=` outputs the raw
    /// value.
    #[inline]
    pub fn alt_escape_sign(&mut self, yes: bool) -> &mut Self {
        self.alt_escape_sign = yes;
        self
    }

    /// Builds the syntax configuration.
    pub fn build(&self) -> Syntax {
        let Self {
            open: o,
            close: c,
            delimiter: d,
            alt_escape_sign,
        } = *self;
        let (escaped, raw) = match alt_escape_sign {
            true => ('-', '='),
            false => ('=', '-'),
        };
        let patterns = vec![
            (Kind::OpenEval, format!("{o}{d}")),
            (Kind::OpenEvalTrim, format!("{o}{d}_")),
            (Kind::OpenEscaped, format!("{o}{d}{escaped}")),
            (Kind::OpenRaw, format!("{o}{d}{raw}")),
            (Kind::OpenComment, format!("{o}{d}#")),
            (Kind::OpenLiteral, format!("{o}{d}{d}")),
            (Kind::Close, format!("{d}{c}")),
            (Kind::CloseDashTrim, format!("-{d}{c}")),
            (Kind::CloseUnderscoreTrim, format!("_{d}{c}")),
            (Kind::CloseLiteral, format!("{d}{d}{c}")),
        ];
        Syntax {
            patterns,
            open_tag: format!("{o}{d}"),
            close_tag: format!("{d}{c}"),
        }
    }
}

impl Kind {
    /// Whether this tag opens a region that must be closed two tokens later.
    pub fn requires_close(&self) -> bool {
        matches!(
            self,
            Self::OpenEval | Self::OpenEvalTrim | Self::OpenEscaped | Self::OpenRaw | Self::OpenComment
        )
    }

    /// Whether this tag ends a region, i.e. `%>`, `-%>` or `_%>`.
    pub fn is_close(&self) -> bool {
        matches!(
            self,
            Self::Close | Self::CloseDashTrim | Self::CloseUnderscoreTrim
        )
    }

    /// Whether this close tag removes the line break that follows it.
    pub fn is_trim_close(&self) -> bool {
        matches!(self, Self::CloseDashTrim | Self::CloseUnderscoreTrim)
    }
}
