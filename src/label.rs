//! Debug label regions.
//!
//! Applications bracket runs of commands with `vkCmdBeginDebugUtilsLabelEXT` and `vkCmdEndDebugUtilsLabelEXT`.
//! These regions nest, and the [`LabelStack`] tracks the regions that are open at any point during recording.
//! A [`LabelPath`] is an immutable snapshot of such a stack, and is what ends up in hazard reports.

use std::fmt;

/// Text printed for an access that was not recorded inside any label region.
pub const NO_LABEL_REGION: &str = "no label region";

/// A single open label region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelFrame {
    /// Name of the region, as given by the application.
    pub name: String,
}

impl LabelFrame {
    /// Create a new frame with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }
}

/// Ordered list of region names, outermost first. Displayed as `A::B::C`, or as
/// [`NO_LABEL_REGION`] when empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct LabelPath {
    names: Vec<String>,
}

impl LabelPath {
    /// The empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nested regions in this path.
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// True if this path has no regions.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over region names, outermost first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns a new path with `self` as the outer regions and `inner` nested inside.
    pub fn join(&self, inner: &LabelPath) -> LabelPath {
        let mut names = Vec::with_capacity(self.depth() + inner.depth());
        names.extend(self.names.iter().cloned());
        names.extend(inner.names.iter().cloned());
        LabelPath {
            names,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LabelPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        LabelPath {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for LabelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_empty() {
            f.write_str(NO_LABEL_REGION)
        } else {
            f.write_str(&self.names.join("::"))
        }
    }
}

/// Stack of currently open label regions inside one recording context.
///
/// Popping an empty stack is not an error. A command buffer may end a region that was begun in an
/// earlier command buffer on the same queue, and that region can only be resolved at submission time.
/// Such pops are counted in [`LabelStack::unmatched_pops()`].
///
/// A stack created with [`LabelStack::with_path()`] distinguishes carried regions from regions pushed
/// onto it afterwards. Once every pushed region is closed, a pop closes the oldest carried region.
#[derive(Debug, Default, Clone)]
pub struct LabelStack {
    frames: Vec<LabelFrame>,
    /// Number of frames at the bottom of the stack that were carried in.
    carried: usize,
    unmatched_pops: u32,
}

impl LabelStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack with the regions of `path` already open.
    pub fn with_path(path: &LabelPath) -> Self {
        Self {
            frames: path.names().map(LabelFrame::new).collect(),
            carried: path.depth(),
            unmatched_pops: 0,
        }
    }

    /// Open a new region.
    pub fn push(&mut self, name: impl Into<String>) {
        self.frames.push(LabelFrame::new(name));
    }

    /// Close the innermost pushed region, or the oldest carried region if no pushed region is open.
    /// Returns `None` if no region was open at all.
    pub fn pop(&mut self) -> Option<LabelFrame> {
        if self.frames.len() > self.carried {
            return self.frames.pop();
        }
        if self.carried > 0 {
            self.carried -= 1;
            return Some(self.frames.remove(0));
        }
        self.unmatched_pops += 1;
        None
    }

    /// Number of carried regions that are still open.
    pub fn carried(&self) -> usize {
        self.carried
    }

    /// Copy of the currently open regions.
    pub fn snapshot(&self) -> LabelPath {
        LabelPath {
            names: self.frames.iter().map(|frame| frame.name.clone()).collect(),
        }
    }

    /// Number of currently open regions.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of pops that found the stack empty.
    pub fn unmatched_pops(&self) -> u32 {
        self.unmatched_pops
    }

    /// Close all regions and forget unmatched pops.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.carried = 0;
        self.unmatched_pops = 0;
    }
}
