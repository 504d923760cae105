use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;

use crate::child::ChildObject;
use crate::error::{Error, Result};

/// Controller reference pointing at `parent`. Fails when the parent has not
/// been persisted yet and therefore has no name or UID to point at.
pub fn owner_reference<P>(parent: &P) -> Result<OwnerReference>
where
    P: Resource<DynamicType = ()>,
{
    let meta = parent.meta();
    let name = meta
        .name
        .clone()
        .ok_or_else(|| Error::OwnershipLink(format!("{} has no name", P::kind(&()))))?;
    let uid = meta
        .uid
        .clone()
        .ok_or_else(|| Error::OwnershipLink(format!("{} {} has no uid", P::kind(&()), name)))?;

    Ok(OwnerReference {
        api_version: P::api_version(&()).to_string(),
        kind: P::kind(&()).to_string(),
        name,
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// Replace the child's owner references with a single controller reference to `parent`.
pub fn set_owner<P>(parent: &P, child: &mut ChildObject) -> Result<()>
where
    P: Resource<DynamicType = ()>,
{
    let reference = owner_reference(parent)?;
    child.metadata_mut().owner_references = Some(vec![reference]);
    Ok(())
}

/// Whether `child` is controlled by the object with the given UID.
pub fn is_controlled_by(child: &ChildObject, uid: &str) -> bool {
    child
        .metadata()
        .owner_references
        .iter()
        .flatten()
        .any(|r| r.controller == Some(true) && r.uid == uid)
}
