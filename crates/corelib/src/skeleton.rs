//! Bone hierarchy with a parent-first evaluation order.

use crate::error::{SkeletonError, SkeletonResult};
use crate::transform::Transform;

/// Bone identifier: index into [`Skeleton::bones`].
pub type BoneId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub name: String,
    /// `None` for a root bone.
    pub parent: Option<BoneId>,
    /// Rest-state transform authored with the model.
    pub bind: Transform,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<BoneId>, bind: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            bind,
        }
    }

    pub fn root(name: impl Into<String>, bind: Transform) -> Self {
        Self::new(name, None, bind)
    }
}

/// Validated bone hierarchy. Bones may be declared in any order; `order()`
/// yields ids so that every parent comes before all of its children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
    order: Vec<BoneId>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> SkeletonResult<Self> {
        let mut depth = Vec::with_capacity(bones.len());
        for (id, bone) in bones.iter().enumerate() {
            depth.push(Self::depth_of(&bones, id, bone)?);
        }

        // Stable sort keeps declaration order among bones of equal depth.
        let mut order: Vec<BoneId> = (0..bones.len()).collect();
        order.sort_by_key(|&id| depth[id]);

        Ok(Self { bones, order })
    }

    fn depth_of(bones: &[Bone], id: BoneId, bone: &Bone) -> SkeletonResult<usize> {
        let mut depth = 0;
        let mut current = bone.parent;
        while let Some(parent) = current {
            let Some(parent_bone) = bones.get(parent) else {
                let child = if depth == 0 { id } else { Self::child_of(bones, parent, id) };
                return Err(SkeletonError::UnknownParent {
                    bone: child,
                    name: bones[child].name.clone(),
                    parent,
                });
            };
            depth += 1;
            if depth > bones.len() {
                return Err(SkeletonError::Cycle {
                    bone: id,
                    name: bone.name.clone(),
                });
            }
            current = parent_bone.parent;
        }
        Ok(depth)
    }

    /// Finds the ancestor of `start` whose parent is `parent`.
    fn child_of(bones: &[Bone], parent: BoneId, start: BoneId) -> BoneId {
        let mut current = start;
        while let Some(p) = bones[current].parent {
            if p == parent {
                return current;
            }
            current = p;
        }
        start
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Evaluation order: parents strictly before children.
    pub fn order(&self) -> &[BoneId] {
        &self.order
    }

    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.bones.iter().position(|b| b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(name: &str, parent: Option<BoneId>) -> Bone {
        Bone::new(name, parent, Transform::identity())
    }

    #[test]
    fn order_puts_parents_first() {
        // Declared child-first on purpose.
        let skeleton = Skeleton::new(vec![
            bone("hand", Some(2)),
            bone("root", None),
            bone("arm", Some(1)),
        ])
        .expect("valid hierarchy");

        let order = skeleton.order();
        let pos = |id: BoneId| order.iter().position(|&b| b == id).unwrap();
        assert_eq!(order.len(), 3);
        assert!(pos(1) < pos(2));
        assert!(pos(2) < pos(0));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = Skeleton::new(vec![bone("root", None), bone("orphan", Some(7))])
            .expect_err("parent 7 does not exist");
        assert_eq!(
            err,
            SkeletonError::UnknownParent {
                bone: 1,
                name: "orphan".into(),
                parent: 7,
            }
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let err = Skeleton::new(vec![bone("a", Some(1)), bone("b", Some(0))])
            .expect_err("a and b are each other's parent");
        assert!(matches!(err, SkeletonError::Cycle { .. }));
    }

    #[test]
    fn find_by_name() {
        let skeleton = Skeleton::new(vec![bone("root", None), bone("spine", Some(0))]).unwrap();
        assert_eq!(skeleton.find("spine"), Some(1));
        assert_eq!(skeleton.find("tail"), None);
    }
}
