//! Independent deep copies of a model.
//!
//! The typed parts of a model are owned data and copy structurally. Attachment
//! maps go through the sanitizer so that callbacks, live handles and symbol keys
//! never survive into a snapshot. One snapshot call is one clone call: at most one
//! diagnostic per call.

use hn_sanitize::{CloneSession, Sanitized, Sanitizer};

use crate::schema::{Attachments, SystemModel, SystemNode, SystemPipe};

#[derive(Debug, Default)]
pub struct SnapshotCloner {
    sanitizer: Sanitizer,
}

impl SnapshotCloner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sanitizer(sanitizer: Sanitizer) -> Self {
        Self { sanitizer }
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn snapshot(&self, model: &SystemModel) -> Sanitized<SystemModel> {
        let mut session = self.sanitizer.session();

        let mut nodes = Vec::with_capacity(model.nodes.len());
        for (i, node) in model.nodes.iter().enumerate() {
            let index = i.to_string();
            nodes.push(SystemNode {
                id: node.id.clone(),
                name: node.name.clone(),
                position: node.position,
                props: node.props.clone(),
                attachments: clone_attachments(&mut session, &["nodes", index.as_str()], &node.attachments),
            });
        }

        let mut pipes = Vec::with_capacity(model.pipes.len());
        for (i, pipe) in model.pipes.iter().enumerate() {
            let index = i.to_string();
            pipes.push(SystemPipe {
                id: pipe.id.clone(),
                name: pipe.name.clone(),
                from: pipe.from.clone(),
                to: pipe.to.clone(),
                diameter: pipe.diameter,
                length: pipe.length,
                roughness: pipe.roughness,
                flow_rate: pipe.flow_rate,
                minor_loss_k: pipe.minor_loss_k,
                attachments: clone_attachments(&mut session, &["pipes", index.as_str()], &pipe.attachments),
            });
        }

        let attachments = clone_attachments::<&str>(&mut session, &[], &model.attachments);
        let value = SystemModel {
            nodes,
            pipes,
            fluid_id: model.fluid_id.clone(),
            units: model.units,
            ambient_pressure: model.ambient_pressure,
            attachments,
        };

        Sanitized {
            value,
            report: session.finish(),
        }
    }
}

fn clone_attachments<S: AsRef<str>>(
    session: &mut CloneSession<'_>,
    path: &[S],
    attachments: &Attachments,
) -> Attachments {
    if attachments.is_empty() {
        return Attachments::new();
    }
    Attachments::from_entries(session.clone_entries(path, attachments.entries()))
}
