//! Outline parser implementation.

use crate::core::{GenError, GenResult, Location};
use crate::program::{Annotation, Function, Import, PackageId, Param, Program, Stmt, TypeDesc};

pub fn parse(text: &str) -> GenResult<Program> {
    Parser::new(text).parse()
}

/// Lines of a `document` block, collected before any function is parsed so
/// that declarations anywhere at top level are visible to every document.
struct RawDocument<'a> {
    name: String,
    lines: Vec<(usize, &'a str)>,
}

struct Parser<'a> {
    text: &'a str,
    program: Program,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            program: Program::new(PackageId::new("$anon", ".")),
        }
    }

    fn parse(mut self) -> GenResult<Program> {
        let mut documents = Vec::new();
        let text = self.text;
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

        while let Some((line_no, raw)) = lines.next() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("document ") {
                let name = parse_document_name(line_no, rest)?;
                let mut body = Vec::new();
                let mut depth = 1;
                let mut closed = false;
                for (no, raw) in lines.by_ref() {
                    let trimmed = raw.trim();
                    if trimmed.starts_with(';') {
                        continue;
                    }
                    depth += brace_delta(trimmed);
                    if depth <= 0 {
                        closed = true;
                        break;
                    }
                    body.push((no, raw));
                }
                if !closed {
                    return Err(error(line_no, format!("document \"{name}\" is not closed")));
                }
                documents.push(RawDocument { name, lines: body });
            } else {
                self.parse_declaration(line_no, line)?;
            }
        }

        for document in documents {
            self.parse_document(document)?;
        }
        Ok(self.program)
    }

    fn parse_declaration(&mut self, line_no: usize, line: &str) -> GenResult<()> {
        let decl = line
            .strip_suffix(';')
            .ok_or_else(|| error(line_no, "declaration must end with ';'"))?
            .trim();

        if let Some(rest) = decl.strip_prefix("module ") {
            self.program.package = parse_package_id(line_no, rest.trim())?;
        } else if let Some(rest) = decl.strip_prefix("import ") {
            let import = parse_import(line_no, rest.trim())?;
            log::trace!("outline import {} as {}", import.package, import.prefix);
            self.program.add_import(import);
        } else if let Some(rest) = decl.strip_prefix("type ") {
            let name = rest.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(error(line_no, format!("invalid type name '{name}'")));
            }
            self.program.declare_type(name);
        } else {
            return Err(error(line_no, format!("unexpected declaration '{decl}'")));
        }
        Ok(())
    }

    fn parse_document(&mut self, raw: RawDocument<'a>) -> GenResult<()> {
        let doc = self.program.add_document(raw.name.clone(), dedent(&raw.lines));
        let mut annotations = Vec::new();
        let mut first_line: Option<(usize, u32)> = None;
        let mut i = 0;

        while i < raw.lines.len() {
            let (no, text) = raw.lines[i];
            let trimmed = text.trim();
            i += 1;
            if trimmed.is_empty() {
                continue;
            }
            let column = (text.len() - text.trim_start().len()) as u32 + 1;

            if let Some(annot) = trimmed.strip_prefix('@') {
                annotations.push(self.parse_annotation(no, annot)?);
                first_line.get_or_insert((no, column));
                continue;
            }

            let (line, col) = first_line.take().unwrap_or((no, column));
            let location = Location::new(raw.name.clone(), line as u32, col);
            let (mut function, opens_body) = self.parse_header(no, trimmed, location)?;
            function.annotations = std::mem::take(&mut annotations);

            if opens_body {
                let mut depth = 1;
                loop {
                    let Some(&(_, body_line)) = raw.lines.get(i) else {
                        return Err(error(no, format!("body of '{}' is not closed", function.name)));
                    };
                    i += 1;
                    let stmt = body_line.trim();
                    depth += brace_delta(stmt);
                    if depth <= 0 {
                        break;
                    }
                    if !stmt.is_empty() {
                        function.body.push(Stmt::Source(stmt.to_string()));
                    }
                }
            }
            self.program.add_function(doc, function)?;
        }

        if !annotations.is_empty() {
            let line = first_line.map(|(l, _)| l).unwrap_or(0);
            return Err(error(line, "annotation is not attached to a function"));
        }
        Ok(())
    }

    /// Parse a function header. The flag tells whether a body block follows.
    fn parse_header(
        &self,
        line_no: usize,
        text: &str,
        location: Location,
    ) -> GenResult<(Function, bool)> {
        let (public, rest) = match text.strip_prefix("public ") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };
        let rest = rest
            .strip_prefix("function ")
            .ok_or_else(|| error(line_no, format!("expected function declaration, found '{text}'")))?
            .trim_start();

        let open = rest
            .find('(')
            .ok_or_else(|| error(line_no, "missing parameter list"))?;
        let name = rest[..open].trim();
        if name.is_empty() {
            return Err(error(line_no, "missing function name"));
        }
        let close = matching_paren(rest, open)
            .ok_or_else(|| error(line_no, "unbalanced parameter list"))?;

        let mut function = Function::new(name, location);
        function.public = public;
        self.parse_params(line_no, &rest[open + 1..close], &mut function)?;

        let tail = rest[close + 1..].trim();
        let (signature_tail, opens_body) = if let Some(t) = tail.strip_suffix("{}") {
            (t.trim(), false)
        } else if let Some(t) = tail.strip_suffix('{') {
            (t.trim(), true)
        } else {
            return Err(error(line_no, "expected '{' after function signature"));
        };

        if !signature_tail.is_empty() {
            let ret = signature_tail
                .strip_prefix("returns")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| error(line_no, format!("unexpected '{signature_tail}'")))?;
            function.return_type = Some(self.resolve_type(ret));
        }
        Ok((function, opens_body))
    }

    fn parse_params(&self, line_no: usize, text: &str, function: &mut Function) -> GenResult<()> {
        for piece in split_top_level(text, ',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if function.rest_param.is_some() {
                return Err(error(line_no, "rest parameter must be the last parameter"));
            }

            let (decl, default) = match piece.split_once('=') {
                Some((decl, value)) => (decl.trim(), Some(value.trim().to_string())),
                None => (piece, None),
            };
            let (ty_text, name) = decl
                .rsplit_once(char::is_whitespace)
                .ok_or_else(|| error(line_no, format!("parameter '{decl}' needs a type and a name")))?;
            let ty_text = ty_text.trim();

            if let Some(rest_ty) = ty_text.strip_suffix("...") {
                if default.is_some() {
                    return Err(error(line_no, "rest parameter cannot have a default"));
                }
                function.rest_param = Some(Param::new(name, self.resolve_type(rest_ty.trim())));
                continue;
            }

            function.params.push(Param {
                name: name.to_string(),
                ty: self.resolve_type(ty_text),
                default,
            });
        }
        Ok(())
    }

    fn parse_annotation(&self, line_no: usize, text: &str) -> GenResult<Annotation> {
        let reference = text
            .split(|c: char| c.is_whitespace() || c == '{')
            .next()
            .unwrap_or_default();
        match reference.split_once(':') {
            Some((prefix, name)) => {
                let import = self
                    .program
                    .import_by_prefix(prefix)
                    .ok_or_else(|| error(line_no, format!("undefined module prefix '{prefix}'")))?;
                Ok(Annotation {
                    package: import.package.clone(),
                    name: name.to_string(),
                })
            }
            None if !reference.is_empty() => Ok(Annotation {
                package: self.program.package.clone(),
                name: reference.to_string(),
            }),
            None => Err(error(line_no, "empty annotation")),
        }
    }

    fn resolve_type(&self, text: &str) -> TypeDesc {
        let text = text.trim();
        if let Some(inner) = strip_parens(text) {
            return self.resolve_type(inner);
        }
        let members = split_top_level(text, '|')
            .into_iter()
            .map(|member| self.resolve_member(member.trim()))
            .collect();
        TypeDesc::union(members)
    }

    fn resolve_member(&self, text: &str) -> TypeDesc {
        if let Some(ty) = TypeDesc::builtin(text) {
            return ty;
        }
        if let Some(inner) = text.strip_suffix('?') {
            return TypeDesc::union(vec![self.resolve_type(inner), TypeDesc::Nil]);
        }
        if let Some(inner) = strip_parens(text) {
            return self.resolve_type(inner);
        }
        if let Some(element) = text.strip_suffix("[]") {
            return TypeDesc::Array(Box::new(self.resolve_type(element)));
        }
        if let Some(element) = text.strip_prefix("map<").and_then(|t| t.strip_suffix('>')) {
            return TypeDesc::Map(Box::new(self.resolve_type(element)));
        }
        if text
            .strip_prefix("record")
            .is_some_and(|rest| rest.trim_start().starts_with('{') && text.ends_with('}'))
        {
            return TypeDesc::Record(text.to_string());
        }
        if let Some((prefix, name)) = text.split_once(':') {
            if let Some(import) = self.program.import_by_prefix(prefix) {
                return TypeDesc::named(import.package.clone(), name);
            }
        } else if self.program.has_type(text) {
            return TypeDesc::named(self.program.package.clone(), text);
        }
        log::debug!("outline type '{text}' does not resolve");
        TypeDesc::Unresolved(text.to_string())
    }
}

fn error(line: usize, reason: impl Into<String>) -> GenError {
    GenError::Outline {
        line,
        reason: reason.into(),
    }
}

fn parse_package_id(line_no: usize, text: &str) -> GenResult<PackageId> {
    match text.split_once('/') {
        Some((org, name)) if !org.is_empty() && !name.is_empty() => Ok(PackageId::new(org, name)),
        _ => Err(error(line_no, format!("invalid package '{text}', expected org/name"))),
    }
}

fn parse_import(line_no: usize, text: &str) -> GenResult<Import> {
    let (head, exports) = match text.split_once('{') {
        Some((head, rest)) => {
            let list = rest
                .trim()
                .strip_suffix('}')
                .ok_or_else(|| error(line_no, "unterminated export list"))?;
            (head.trim(), Some(list))
        }
        None => (text, None),
    };

    let parts: Vec<&str> = head.split_whitespace().collect();
    let mut import = match parts.as_slice() {
        [package] => Import::new(parse_package_id(line_no, package)?),
        [package, "as", prefix] => Import::with_prefix(parse_package_id(line_no, package)?, *prefix),
        _ => return Err(error(line_no, format!("invalid import '{head}'"))),
    };

    for name in exports.into_iter().flat_map(|list| list.split(',')) {
        let name = name.trim();
        if !name.is_empty() {
            import.define(name);
        }
    }
    Ok(import)
}

fn parse_document_name(line_no: usize, text: &str) -> GenResult<String> {
    let name = text
        .trim()
        .strip_suffix('{')
        .ok_or_else(|| error(line_no, "expected '{' after document name"))?
        .trim();
    let name = name
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name);
    if name.is_empty() {
        return Err(error(line_no, "missing document name"));
    }
    Ok(name.to_string())
}

/// Net change in brace depth, ignoring braces inside string literals.
fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut in_string = false;
    let mut escaped = false;
    for ch in line.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, ch) in text.char_indices().skip_while(|&(i, _)| i < open) {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Inner text of `(...)` when the parentheses enclose the whole of `text`.
fn strip_parens(text: &str) -> Option<&str> {
    if text.len() > 2 && text.starts_with('(') && matching_paren(text, 0) == Some(text.len() - 1) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' | '<' | '{' | '[' => depth += 1,
            ')' | '>' | '}' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn dedent(lines: &[(usize, &str)]) -> String {
    let indent = lines
        .iter()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(_, l)| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut out = String::new();
    for (_, line) in lines {
        let line = line.get(indent..).unwrap_or_else(|| line.trim_start());
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
