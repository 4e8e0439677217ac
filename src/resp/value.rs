//! RESP value model
//!
//! One enum variant per RESP2 type. Null bulk strings and null arrays are
//! `None`, which keeps them distinct from the empty string and empty array.
//!
//! Nesting depth is only bounded by memory, so every operation that visits
//! children (drop, clone, comparison, formatting, sizing) runs on a heap
//! stack through [`Walk`] instead of recursing.

use std::fmt;

use bytes::Bytes;

/// RESP type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RespType {
    SimpleString = b'+',
    Error = b'-',
    Integer = b':',
    BulkString = b'$',
    Array = b'*',
}

impl RespType {
    /// Map a leading tag byte to its type
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'+' => Some(RespType::SimpleString),
            b'-' => Some(RespType::Error),
            b':' => Some(RespType::Integer),
            b'$' => Some(RespType::BulkString),
            b'*' => Some(RespType::Array),
            _ => None,
        }
    }

    /// The tag byte written before the value
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A decoded RESP value
pub enum RespValue {
    /// `+<text>\r\n`
    SimpleString(Bytes),

    /// `-<text>\r\n`
    Error(Bytes),

    /// `:<decimal>\r\n`, kept as its decimal text
    Integer(Bytes),

    /// `$<len>\r\n<bytes>\r\n`, or `$-1\r\n` when `None`
    BulkString(Option<Bytes>),

    /// `*<count>\r\n<values>`, or `*-1\r\n` when `None`
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    pub fn simple_string(text: impl Into<Bytes>) -> Self {
        RespValue::SimpleString(text.into())
    }

    pub fn error(text: impl Into<Bytes>) -> Self {
        RespValue::Error(text.into())
    }

    /// Integer from its decimal text, stored verbatim
    pub fn integer_text(text: impl Into<Bytes>) -> Self {
        RespValue::Integer(text.into())
    }

    pub fn integer(n: i64) -> Self {
        RespValue::Integer(Bytes::from(n.to_string()))
    }

    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    pub fn null_bulk_string() -> Self {
        RespValue::BulkString(None)
    }

    pub fn array(children: Vec<RespValue>) -> Self {
        RespValue::Array(Some(children))
    }

    pub fn null_array() -> Self {
        RespValue::Array(None)
    }

    /// Array of bulk strings, the shape of a client command
    pub fn command<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        RespValue::Array(Some(
            args.into_iter().map(|a| RespValue::BulkString(Some(a.into()))).collect(),
        ))
    }

    /// The value's type tag
    pub fn kind(&self) -> RespType {
        match self {
            RespValue::SimpleString(_) => RespType::SimpleString,
            RespValue::Error(_) => RespType::Error,
            RespValue::Integer(_) => RespType::Integer,
            RespValue::BulkString(_) => RespType::BulkString,
            RespValue::Array(_) => RespType::Array,
        }
    }

    pub fn is_simple_string(&self) -> bool {
        matches!(self, RespValue::SimpleString(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, RespValue::Integer(_))
    }

    pub fn is_bulk_string(&self) -> bool {
        matches!(self, RespValue::BulkString(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, RespValue::Array(_))
    }

    /// True for the null bulk string and the null array
    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::BulkString(None) | RespValue::Array(None))
    }

    /// Text or payload bytes of a scalar value
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            RespValue::SimpleString(b) | RespValue::Error(b) | RespValue::Integer(b) => Some(&b[..]),
            RespValue::BulkString(b) => b.as_deref(),
            RespValue::Array(_) => None,
        }
    }

    /// Children of a non-null array
    pub fn children(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(Some(children)) => Some(children.as_slice()),
            _ => None,
        }
    }

    /// Parse the decimal text of an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RespValue::Integer(text) => std::str::from_utf8(text).ok()?.parse().ok(),
            _ => None,
        }
    }

    /// Exact number of bytes in the encoded wire form
    pub fn encoded_len(&self) -> usize {
        self.walk()
            .map(|visit| match visit {
                Visit::Enter(node) => node.header_len(),
                Visit::Leave => 0,
            })
            .sum()
    }

    /// Encoded size of this node alone; arrays count only their header
    fn header_len(&self) -> usize {
        match self {
            RespValue::SimpleString(b) | RespValue::Error(b) | RespValue::Integer(b) => {
                1 + b.len() + 2
            }
            RespValue::BulkString(None) | RespValue::Array(None) => 1 + 2 + 2,
            RespValue::BulkString(Some(b)) => 1 + decimal_len(b.len()) + 2 + b.len() + 2,
            RespValue::Array(Some(children)) => 1 + decimal_len(children.len()) + 2,
        }
    }

    /// Pre-order traversal of this value and all of its descendants
    pub(crate) fn walk(&self) -> Walk<'_> {
        Walk {
            root: Some(self),
            stack: Vec::new(),
        }
    }

    /// Copy of this node; a non-null array comes back empty
    fn clone_shallow(&self) -> Self {
        match self {
            RespValue::SimpleString(b) => RespValue::SimpleString(b.clone()),
            RespValue::Error(b) => RespValue::Error(b.clone()),
            RespValue::Integer(b) => RespValue::Integer(b.clone()),
            RespValue::BulkString(b) => RespValue::BulkString(b.clone()),
            RespValue::Array(None) => RespValue::Array(None),
            RespValue::Array(Some(_)) => RespValue::Array(Some(Vec::new())),
        }
    }

    /// Node equality, comparing arrays by length only
    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RespValue::SimpleString(a), RespValue::SimpleString(b))
            | (RespValue::Error(a), RespValue::Error(b))
            | (RespValue::Integer(a), RespValue::Integer(b)) => a == b,
            (RespValue::BulkString(a), RespValue::BulkString(b)) => a == b,
            (RespValue::Array(None), RespValue::Array(None)) => true,
            (RespValue::Array(Some(a)), RespValue::Array(Some(b))) => a.len() == b.len(),
            _ => false,
        }
    }
}

/// Number of decimal digits needed to print `n`
fn decimal_len(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

// =============================================================================
// Traversal
// =============================================================================

/// One step of a [`Walk`]
pub(crate) enum Visit<'a> {
    /// A node, visited before its children
    Enter(&'a RespValue),

    /// The most recently entered non-null array has no more children
    Leave,
}

/// Heap-stack pre-order traversal
pub(crate) struct Walk<'a> {
    root: Option<&'a RespValue>,
    stack: Vec<std::slice::Iter<'a, RespValue>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Visit<'a>> {
        let node = match self.root.take() {
            Some(root) => root,
            None => match self.stack.last_mut()?.next() {
                Some(child) => child,
                None => {
                    self.stack.pop();
                    return Some(Visit::Leave);
                }
            },
        };
        if let RespValue::Array(Some(children)) = node {
            self.stack.push(children.iter());
        }
        Some(Visit::Enter(node))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Drop for RespValue {
    fn drop(&mut self) {
        let mut pending = match self {
            RespValue::Array(Some(children)) if !children.is_empty() => std::mem::take(children),
            _ => return,
        };
        // Each popped value is emptied first, so its own drop never descends
        while let Some(mut value) = pending.pop() {
            if let RespValue::Array(Some(children)) = &mut value {
                pending.append(children);
            }
        }
    }
}

impl Clone for RespValue {
    fn clone(&self) -> Self {
        let mut open: Vec<Vec<RespValue>> = Vec::new();
        for visit in self.walk() {
            let done = match visit {
                Visit::Enter(RespValue::Array(Some(children))) => {
                    open.push(Vec::with_capacity(children.len()));
                    continue;
                }
                Visit::Enter(node) => node.clone_shallow(),
                Visit::Leave => match open.pop() {
                    Some(items) => RespValue::Array(Some(items)),
                    None => break,
                },
            };
            match open.last_mut() {
                Some(parent) => parent.push(done),
                None => return done,
            }
        }
        unreachable!("walk always completes its root")
    }
}

impl PartialEq for RespValue {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.walk();
        let mut right = other.walk();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(Visit::Enter(a)), Some(Visit::Enter(b))) if a.shallow_eq(b) => {}
                (Some(Visit::Leave), Some(Visit::Leave)) => {}
                _ => return false,
            }
        }
    }
}

impl Eq for RespValue {}

impl fmt::Debug for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first: Vec<bool> = Vec::new();
        for visit in self.walk() {
            match visit {
                Visit::Enter(node) => {
                    if let Some(first) = first.last_mut() {
                        if !*first {
                            f.write_str(", ")?;
                        }
                        *first = false;
                    }
                    match node {
                        RespValue::SimpleString(b) => write!(f, "SimpleString({:?})", b)?,
                        RespValue::Error(b) => write!(f, "Error({:?})", b)?,
                        RespValue::Integer(b) => write!(f, "Integer({:?})", b)?,
                        RespValue::BulkString(b) => write!(f, "BulkString({:?})", b)?,
                        RespValue::Array(None) => f.write_str("Array(None)")?,
                        RespValue::Array(Some(_)) => {
                            f.write_str("Array(Some([")?;
                            first.push(true);
                        }
                    }
                }
                Visit::Leave => {
                    first.pop();
                    f.write_str("]))")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first: Vec<bool> = Vec::new();
        for visit in self.walk() {
            match visit {
                Visit::Enter(node) => {
                    if let Some(first) = first.last_mut() {
                        if !*first {
                            f.write_str(", ")?;
                        }
                        *first = false;
                    }
                    match node {
                        RespValue::SimpleString(b) => write!(f, "{}", b.escape_ascii())?,
                        RespValue::Error(b) => write!(f, "(error) {}", b.escape_ascii())?,
                        RespValue::Integer(b) => write!(f, "(integer) {}", b.escape_ascii())?,
                        RespValue::BulkString(Some(b)) => write!(f, "\"{}\"", b.escape_ascii())?,
                        RespValue::BulkString(None) | RespValue::Array(None) => {
                            f.write_str("(nil)")?
                        }
                        RespValue::Array(Some(_)) => {
                            f.write_str("[")?;
                            first.push(true);
                        }
                    }
                }
                Visit::Leave => {
                    first.pop();
                    f.write_str("]")?;
                }
            }
        }
        Ok(())
    }
}
