// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Which Wikidata classes count as PER, LOC or ORG. An entity has type T
// when one of its "instance of" (P31) values is T's root class or any
// transitive "subclass of" (P279) descendant of it.

use crate::dump::Entity;
use crate::error::{Error, Result};
use crate::record::EntityType;
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Reverse P279 edges: parent class -> direct subclasses.
#[derive(Debug, Default)]
pub struct SubclassGraph {
    children: HashMap<String, Vec<String>>,
}

impl SubclassGraph {
    pub fn new() -> SubclassGraph {
        SubclassGraph::default()
    }

    pub fn add_entity(&mut self, entity: &Entity) {
        for parent in entity.subclass_of() {
            self.add_edge(&entity.id, parent);
        }
    }

    pub fn add_edge(&mut self, child: &str, parent: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
    }

    /// `root` plus all its transitive subclasses. Cycles in the class
    /// hierarchy, which Wikidata does contain, are tolerated.
    pub fn descendants(&self, root: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(root.to_string());
        queue.push_back(root);
        while let Some(class) = queue.pop_front() {
            if let Some(children) = self.children.get(class) {
                for child in children {
                    if seen.insert(child.clone()) {
                        queue.push_back(child);
                    }
                }
            }
        }
        seen
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubclassIndex {
    classes: BTreeMap<EntityType, HashSet<String>>,
}

impl SubclassIndex {
    /// Index with just the root classes, no subclasses.
    pub fn roots_only() -> SubclassIndex {
        let mut index = SubclassIndex::default();
        for t in EntityType::ALL {
            index
                .classes
                .insert(t, HashSet::from([t.wikidata_class().to_string()]));
        }
        index
    }

    pub fn from_graph(graph: &SubclassGraph, types: &[EntityType]) -> SubclassIndex {
        let mut index = SubclassIndex::default();
        for &t in types {
            let classes = graph.descendants(t.wikidata_class());
            info!("{} has {} classes", t, classes.len());
            index.classes.insert(t, classes);
        }
        index
    }

    /// Builds the index by scanning a whole dump for P279 claims.
    pub fn from_entities<I>(entities: I, types: &[EntityType]) -> Result<SubclassIndex>
    where
        I: IntoIterator<Item = Result<Entity>>,
    {
        let mut graph = SubclassGraph::new();
        for entity in entities {
            graph.add_entity(&entity?);
        }
        Ok(SubclassIndex::from_graph(&graph, types))
    }

    pub fn classes(&self, t: EntityType) -> Option<&HashSet<String>> {
        self.classes.get(&t)
    }

    /// Types whose class set contains any of `instance_of`, in sorted order.
    pub fn types_of<'a, I>(&self, instance_of: I) -> Vec<EntityType>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let iofs: Vec<&str> = instance_of.into_iter().collect();
        let mut types = Vec::new();
        for (t, classes) in &self.classes {
            let fallback = t.wikidata_class();
            let matched = if classes.is_empty() {
                iofs.contains(&fallback)
            } else {
                iofs.iter().any(|c| classes.contains(*c))
            };
            if matched {
                types.push(*t);
            }
        }
        types
    }

    /// Keeps only the given types.
    pub fn restrict(&mut self, types: &[EntityType]) {
        self.classes.retain(|t, _| types.contains(t));
    }

    /// Reads lines of "TYPE<TAB>Qid". Types without any line fall back to
    /// their root class.
    pub fn load(path: &Path) -> Result<SubclassIndex> {
        let reader = BufReader::new(File::open(path)?);
        let mut index = SubclassIndex::roots_only();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (t, class) = line.split_once('\t').ok_or_else(|| Error::BadRow {
                line: i as u64 + 1,
                reason: "expected TYPE<TAB>class".to_string(),
            })?;
            let t: EntityType = t.trim().parse()?;
            index
                .classes
                .entry(t)
                .or_default()
                .insert(class.trim().to_string());
        }
        Ok(index)
    }

    /// Writes the index sorted by type, then class id.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for (t, classes) in &self.classes {
            let sorted: BTreeSet<&String> = classes.iter().collect();
            for class in sorted {
                writeln!(out, "{}\t{}", t, class)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> SubclassGraph {
        let mut g = SubclassGraph::new();
        g.add_edge("Q515", "Q82794"); // city < geographic region
        g.add_edge("Q1549591", "Q515"); // big city < city
        g.add_edge("Q82794", "Q1549591"); // a cycle
        g.add_edge("Q4830453", "Q43229"); // business < organization
        g
    }

    #[test]
    fn computes_transitive_closure_with_cycles() {
        let loc = graph().descendants("Q82794");
        let mut loc: Vec<_> = loc.into_iter().collect();
        loc.sort();
        assert_eq!(loc, vec!["Q1549591", "Q515", "Q82794"]);
    }

    #[test]
    fn assigns_types() {
        let index = SubclassIndex::from_graph(&graph(), &EntityType::ALL);
        assert_eq!(index.types_of(["Q515"]), vec![EntityType::Loc]);
        assert_eq!(
            index.types_of(["Q4830453", "Q1549591", "Q5"]),
            vec![EntityType::Loc, EntityType::Org, EntityType::Per]
        );
        assert!(index.types_of(["Q7"]).is_empty());
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subclasses.tsv");
        let index = SubclassIndex::from_graph(&graph(), &EntityType::ALL);
        index.save(&path).unwrap();
        assert_eq!(SubclassIndex::load(&path).unwrap(), index);
    }
}
