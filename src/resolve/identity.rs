use super::predicate::has_plan_id;
use crate::error::TransformError;
use crate::spec::EntitySpec;

/// Locates the position of the direct child of `root` tagged with `plan_id`.
///
/// Only the immediate children of the application root are searched.
/// `requested_by` names the operation asking, for the error message.
pub fn child_index_by_plan_id(
    root: &EntitySpec,
    plan_id: &str,
    requested_by: &str,
) -> Result<usize, TransformError> {
    root.children()
        .iter()
        .position(has_plan_id(plan_id))
        .ok_or_else(|| TransformError::TargetNotFound {
            missing: vec![plan_id.to_string()],
            requested_by: requested_by.to_string(),
        })
}

/// Finds the direct child of `root` representing the node with `plan_id`.
pub fn find_child_by_plan_id<'a>(
    root: &'a EntitySpec,
    plan_id: &str,
    requested_by: &str,
) -> Result<&'a EntitySpec, TransformError> {
    let index = child_index_by_plan_id(root, plan_id, requested_by)?;
    Ok(&root.children()[index])
}

pub fn find_child_by_plan_id_mut<'a>(
    root: &'a mut EntitySpec,
    plan_id: &str,
    requested_by: &str,
) -> Result<&'a mut EntitySpec, TransformError> {
    let index = child_index_by_plan_id(root, plan_id, requested_by)?;
    Ok(&mut root.children_mut()[index])
}
