use anyhow::Result;

use syncval_attrib::{LabelPath, LabelStack, NO_LABEL_REGION};

#[test]
pub fn balanced_push_pop_restores_snapshot() -> Result<()> {
    let mut stack = LabelStack::new();
    stack.push("Frame");
    let before = stack.snapshot();

    stack.push("Shadows");
    stack.push("Cascade 0");
    stack.pop();
    stack.push("Cascade 1");
    stack.pop();
    stack.pop();

    assert_eq!(stack.snapshot(), before, "Balanced labels should leave the stack as it was.");
    assert_eq!(stack.unmatched_pops(), 0, "No pop should have been unmatched.");
    Ok(())
}

#[test]
pub fn snapshot_is_independent_of_stack() -> Result<()> {
    let mut stack = LabelStack::new();
    stack.push("A");
    let snapshot = stack.snapshot();
    stack.push("B");
    stack.pop();
    stack.pop();

    assert_eq!(snapshot.to_string(), "A", "Later stack changes should not affect an earlier snapshot.");
    assert_eq!(stack.depth(), 0);
    Ok(())
}

#[test]
pub fn pop_on_empty_stack_is_counted() -> Result<()> {
    let mut stack = LabelStack::new();
    assert!(stack.pop().is_none(), "Popping an empty stack should return nothing.");
    stack.push("A");
    assert_eq!(stack.pop().map(|frame| frame.name), Some(String::from("A")));
    assert!(stack.pop().is_none());

    assert_eq!(stack.unmatched_pops(), 2, "Both pops on an empty stack should be counted.");
    assert_eq!(stack.depth(), 0);

    stack.clear();
    assert_eq!(stack.unmatched_pops(), 0, "Clearing should forget unmatched pops.");
    Ok(())
}

#[test]
pub fn stack_with_carried_path() -> Result<()> {
    let carried: LabelPath = ["Frame", "Opaque"].into_iter().collect();
    let mut stack = LabelStack::with_path(&carried);
    stack.push("Draw");
    assert_eq!(stack.snapshot().to_string(), "Frame::Opaque::Draw");

    stack.pop();
    assert_eq!(stack.snapshot().to_string(), "Frame::Opaque", "A pop should close the pushed region first.");
    stack.pop();
    assert_eq!(
        stack.snapshot().to_string(),
        "Opaque",
        "With no pushed region open, a pop should close the oldest carried region."
    );
    assert_eq!(stack.carried(), 1);
    stack.pop();
    assert!(stack.pop().is_none());
    assert_eq!(stack.unmatched_pops(), 1);
    Ok(())
}

#[test]
pub fn path_display() -> Result<()> {
    assert_eq!(LabelPath::new().to_string(), NO_LABEL_REGION, "An empty path should print as no label region.");
    assert_eq!(LabelPath::new().to_string(), "no label region");

    let outer: LabelPath = ["A"].into_iter().collect();
    let inner: LabelPath = ["B", "C"].into_iter().collect();
    let joined = outer.join(&inner);
    assert_eq!(joined.to_string(), "A::B::C");
    assert_eq!(joined.depth(), 3);
    assert_eq!(joined.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    Ok(())
}
