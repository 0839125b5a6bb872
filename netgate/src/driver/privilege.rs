//! Privilege level management with graph-based navigation.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current privilege level and plans moves between levels.
///
/// Levels form an undirected graph through their `parent` links;
/// moving toward a child runs its enter command, moving back runs
/// its exit command.
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,
    graph: HashMap<String, HashSet<String>>,
    current: Option<String>,
}

/// One hop between adjacent privilege levels.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Level reached after this hop.
    pub target: String,

    /// Command that performs the hop.
    pub command: String,

    /// Password prompt the device may show; `Some` means a secret may be asked.
    pub auth_prompt: Option<Regex>,
}

impl PrivilegeManager {
    /// Create a manager over the given levels. The current level starts unknown.
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        let mut graph: HashMap<String, HashSet<String>> = HashMap::new();
        for (name, level) in &levels {
            graph.entry(name.clone()).or_default();
            if let Some(ref parent) = level.parent {
                graph.entry(name.clone()).or_default().insert(parent.clone());
                graph.entry(parent.clone()).or_default().insert(name.clone());
            }
        }

        Self {
            levels,
            graph,
            current: None,
        }
    }

    /// Find the level whose prompt pattern matches `prompt`.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownPrivilege {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Update the current level from a prompt. Returns the level name.
    pub fn observe_prompt(&mut self, prompt: &str) -> Option<&str> {
        let name = self.determine_from_prompt(prompt).ok()?.name.clone();
        self.current = Some(name);
        self.current.as_deref()
    }

    /// Name of the current level, if known.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Get a privilege level by name.
    pub fn get(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// Shortest list of level names from `from` to `to`, both included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let no_path = || DriverError::NoPrivilegePath {
            from: from.to_string(),
            to: to.to_string(),
        };

        if !self.levels.contains_key(from) || !self.levels.contains_key(to) {
            return Err(no_path().into());
        }
        if from == to {
            return Ok(vec![from.to_string()]);
        }

        let mut queue = VecDeque::from([from.to_string()]);
        let mut parent: HashMap<String, String> = HashMap::new();
        let mut visited = HashSet::from([from.to_string()]);

        while let Some(node) = queue.pop_front() {
            if node == to {
                let mut path = vec![node];
                while let Some(prev) = path.last().and_then(|n| parent.get(n)) {
                    path.push(prev.clone());
                }
                path.reverse();
                return Ok(path);
            }

            for neighbor in self.graph.get(&node).into_iter().flatten() {
                if visited.insert(neighbor.clone()) {
                    parent.insert(neighbor.clone(), node.clone());
                    queue.push_back(neighbor.clone());
                }
            }
        }

        Err(no_path().into())
    }

    /// Hop between two adjacent levels, if the platform defines a command for it.
    pub fn transition(&self, from: &str, to: &str) -> Option<Transition> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        if to_level.parent.as_deref() == Some(from) {
            return Some(Transition {
                target: to.to_string(),
                command: to_level.enter_command.clone()?,
                auth_prompt: to_level.password_prompt.clone(),
            });
        }

        if from_level.parent.as_deref() == Some(to) {
            return Some(Transition {
                target: to.to_string(),
                command: from_level.exit_command.clone()?,
                auth_prompt: None,
            });
        }

        None
    }

    /// Every hop needed to move from `from` to `to`.
    pub fn plan(&self, from: &str, to: &str) -> Result<Vec<Transition>> {
        let path = self.find_path(from, to)?;
        path.windows(2)
            .map(|pair| {
                self.transition(&pair[0], &pair[1]).ok_or_else(|| {
                    DriverError::NoPrivilegePath {
                        from: pair[0].clone(),
                        to: pair[1].clone(),
                    }
                    .into()
                })
            })
            .collect()
    }
}
