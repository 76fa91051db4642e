//! Hosts that drive a shell window.

mod stdio;

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

pub use stdio::{HostInput, HostOutput, StdioHost};

use crate::config::{Action, Config};
use crate::native::{ShellDependencies, StdFileSystem};

impl<R: BufRead + 'static, W: Write + 'static> StdioHost<R, W> {
    /// Collaborators for a window living in this host, with real files.
    pub fn dependencies(self: &Rc<Self>) -> ShellDependencies {
        ShellDependencies {
            content: self.clone(),
            files: Rc::new(StdFileSystem::new(self.idle().clone())),
            chooser: self.clone(),
            window: self.clone(),
        }
    }

    /// Announces the window to the peer with its configured size, page and
    /// accelerators.
    pub fn show(&self, config: &Config) {
        let accelerators: BTreeMap<_, _> = Action::ALL
            .into_iter()
            .map(|action| {
                let accels = config.keybindings.accelerators(action).to_vec();
                (action.name(), accels)
            })
            .collect();
        let content = config
            .content
            .resource_dir
            .as_ref()
            .map(|dir| dir.join(&config.content.index).display().to_string());

        self.send(&HostOutput::Show {
            width: config.window.width,
            height: config.window.height,
            content,
            accelerators,
        });
    }
}
