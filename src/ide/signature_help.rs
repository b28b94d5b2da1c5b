//! Signature help: the function whose argument list holds the cursor.
//!
//! The call is found in the buffer text rather than the syntax tree, since
//! the buffer is usually broken while an argument is being typed (`f(a, `).
//! The callee chain in front of the open `(` resolves against the last good
//! snapshot.

use smol_str::SmolStr;

use super::Analysis;
use crate::annotation::{FragmentInfo, FuncType, first_func};
use crate::base::Position;
use crate::project::Workspace;
use crate::semantic::{ChainPart, Resolver, SemanticIndex, SymbolSource};
use crate::syntax::{Token, TokenKind, tokenize};

/// Result of a signature help request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureHelp {
    /// The declared signature first, then one per `@overload`.
    pub signatures: Vec<SignatureInfo>,
    pub active_signature: usize,
    pub active_parameter: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureInfo {
    /// `function name(a : T, b?) : R`
    pub label: String,
    pub parameters: Vec<ParameterInfo>,
    pub documentation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterInfo {
    pub label: SmolStr,
    /// Annotated type and comment, e.g. `a : number -- the count`.
    pub documentation: Option<String>,
}

/// Signature help at `line`/`col` of `text`, the current contents of `file`.
pub fn signature_help(
    ws: &Workspace,
    file: &str,
    text: &str,
    line: usize,
    col: usize,
) -> Option<SignatureHelp> {
    Analysis::new(ws).signature_help(file, text, line, col)
}

pub(crate) fn signature_help_in(
    index: &SemanticIndex,
    file: &str,
    text: &str,
    position: Position,
) -> Option<SignatureHelp> {
    let call = open_call(text, position)?;
    let mut resolver = Resolver::new(index);
    let (callee, _) = resolver.resolve_chain(file, &call.parts, call.start);
    let callee = callee?;
    if callee.source == SymbolSource::Builtin {
        return None;
    }
    let name = call.parts.last().map(|p| p.name.clone()).unwrap_or_default();

    let mut signatures = Vec::new();
    let mut fragment: Option<&FragmentInfo> = None;
    if let Some(func) = resolver.annotated_func(&callee) {
        signatures.push(type_signature(&name, &func, call.is_method, callee.comment.clone()));
    }
    let body = resolver
        .function_decl(&callee)
        .and_then(|(path, func, line)| Some((index.file(&path)?, func, line)));
    if let Some((decl, func, decl_line)) = body {
        let info = decl.func(func);
        fragment = decl
            .annotate
            .fragment_above(decl_line)
            .or_else(|| decl.annotate.fragment_above(info.span.start.line));
        if signatures.is_empty() {
            let skip = usize::from(call.is_method);
            let params = info
                .params
                .iter()
                .skip(skip)
                .map(|id| body_param(fragment, &decl.var(*id).name))
                .chain(info.is_vararg.then(|| vararg_param(fragment)))
                .collect();
            let returns = fragment
                .map(|f| f.returns.iter().map(|r| r.ty.to_string()).collect())
                .unwrap_or_default();
            signatures.push(signature(&name, params, returns, callee.comment.clone()));
        }
    }
    if let Some(fragment) = fragment {
        for ty in &fragment.overloads {
            if let Some(func) = first_func(ty) {
                signatures.push(type_signature(&name, func, call.is_method, None));
            }
        }
    }
    if signatures.is_empty() {
        return None;
    }

    let active_signature = signatures
        .iter()
        .position(|s| accepts(s, call.commas))
        .unwrap_or(0);
    let parameters = &signatures[active_signature].parameters;
    let active_parameter = match parameters.last() {
        Some(last) if last.label == "..." => call.commas.min(parameters.len() - 1),
        _ => call.commas,
    };
    Some(SignatureHelp {
        signatures,
        active_signature,
        active_parameter,
    })
}

/// A call whose argument list is still open at the cursor.
#[derive(Debug, PartialEq, Eq)]
struct OpenCall {
    parts: Vec<ChainPart>,
    /// Called with `:`.
    is_method: bool,
    /// Top-level commas between the `(` and the cursor.
    commas: usize,
    start: Position,
}

fn open_call(text: &str, position: Position) -> Option<OpenCall> {
    let tokens = tokenize(text).tokens;
    let before: Vec<&Token<'_>> = tokens.iter().take_while(|t| t.span.end <= position).collect();

    let mut depth = 0usize;
    let mut commas = 0;
    let mut open = None;
    for (i, token) in before.iter().enumerate().rev() {
        match token.kind {
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => depth += 1,
            TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket if depth > 0 => depth -= 1,
            TokenKind::LParen => {
                open = Some(i);
                break;
            }
            // inside a table constructor or an index
            TokenKind::LBrace | TokenKind::LBracket => return None,
            TokenKind::Comma if depth == 0 => commas += 1,
            _ => {}
        }
    }

    let (parts, is_method, first) = callee_chain(&before, open?)?;
    if first > 0 && before[first - 1].kind == TokenKind::Function {
        return None;
    }
    Some(OpenCall {
        parts,
        is_method,
        commas,
        start: before[first].span.start,
    })
}

/// The `a.b():c` chain ending just before `tokens[open]`, with the index of
/// its first token.
fn callee_chain(tokens: &[&Token<'_>], open: usize) -> Option<(Vec<ChainPart>, bool, usize)> {
    let mut parts: Vec<ChainPart> = Vec::new();
    let mut is_method = false;
    let mut end = open;
    let mut called = false;
    loop {
        let at = end.checked_sub(1)?;
        if tokens[at].kind != TokenKind::Name {
            return None;
        }
        parts.push(ChainPart {
            name: SmolStr::new(tokens[at].text),
            is_call: called,
        });
        end = at;

        let separator = match at.checked_sub(1) {
            Some(sep) => tokens[sep].kind,
            None => break,
        };
        match separator {
            TokenKind::Dot => {}
            TokenKind::Colon if parts.len() == 1 => is_method = true,
            _ => break,
        }
        end -= 1;
        called = false;
        if end > 0 && tokens[end - 1].kind == TokenKind::RParen {
            end = matching_open(tokens, end - 1)?;
            called = true;
        }
    }
    parts.reverse();
    Some((parts, is_method, end))
}

fn matching_open(tokens: &[&Token<'_>], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        match tokens[i].kind {
            TokenKind::RParen => depth += 1,
            TokenKind::LParen => {
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

fn accepts(signature: &SignatureInfo, commas: usize) -> bool {
    commas < signature.parameters.len()
        || signature.parameters.last().is_some_and(|p| p.label == "...")
}

/// A parameter and the type shown for it in the label.
type Param = (ParameterInfo, Option<String>);

fn body_param(fragment: Option<&FragmentInfo>, name: &SmolStr) -> Param {
    let Some(param) = fragment.and_then(|f| f.param(name)) else {
        let info = ParameterInfo {
            label: name.clone(),
            documentation: None,
        };
        return (info, None);
    };
    let ty = param.ty.to_string();
    let mut doc = format!("{name} : {ty}");
    let comment = param.comment.trim();
    if !comment.is_empty() {
        doc.push_str(" -- ");
        doc.push_str(comment);
    }
    let info = ParameterInfo {
        label: param_label(name, param.optional),
        documentation: Some(doc),
    };
    (info, Some(ty))
}

fn vararg_param(fragment: Option<&FragmentInfo>) -> Param {
    let ty = fragment.and_then(|f| f.vararg.as_ref()).map(|ty| ty.to_string());
    let info = ParameterInfo {
        label: SmolStr::new_static("..."),
        documentation: ty.as_ref().map(|ty| format!("... : {ty}")),
    };
    (info, ty)
}

fn param_label(name: &SmolStr, optional: bool) -> SmolStr {
    if optional {
        SmolStr::new(format!("{name}?"))
    } else {
        name.clone()
    }
}

fn type_signature(name: &str, func: &FuncType, is_method: bool, doc: Option<String>) -> SignatureInfo {
    let skip = usize::from(is_method && func.params.first().is_some_and(|p| p.name == "self"));
    let params = func
        .params
        .iter()
        .skip(skip)
        .map(|param| {
            let ty = param.ty.to_string();
            let info = ParameterInfo {
                label: param_label(&param.name, param.optional),
                documentation: Some(format!("{} : {ty}", param.name)),
            };
            (info, Some(ty))
        })
        .collect();
    let returns = func.returns.iter().map(|r| r.to_string()).collect();
    signature(name, params, returns, doc)
}

fn signature(
    name: &str,
    params: Vec<Param>,
    returns: Vec<String>,
    documentation: Option<String>,
) -> SignatureInfo {
    let shown: Vec<String> = params
        .iter()
        .map(|(param, ty)| match ty {
            Some(ty) => format!("{} : {ty}", param.label),
            None => param.label.to_string(),
        })
        .collect();
    let mut label = format!("function {name}({})", shown.join(", "));
    if !returns.is_empty() {
        label.push_str(" : ");
        label.push_str(&returns.join(", "));
    }
    SignatureInfo {
        label,
        parameters: params.into_iter().map(|(param, _)| param).collect(),
        documentation: documentation.filter(|d| !d.trim().is_empty()),
    }
}
