use std::collections::{HashMap, HashSet};

use classtext_class_file::{ClassFile, CpInfo, LdcSite, MethodInfo};
use log::{debug, warn};

use crate::{filter::VisibilityFilter, StringsError};

/// A constant string loaded by some `ldc`/`ldc_w` that looks user visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringCandidate {
    pub text: String,
    /// The Utf8 entry holding the text.
    pub utf8_index: u16,
    /// The String entry pointing at `utf8_index`, when the load went through one.
    pub string_index: Option<u16>,
    pub occurrences: usize,
    /// `name` + `descriptor` of every method loading the text, in first-seen order.
    pub methods: Vec<String>,
    /// The Utf8 entry is also used by something other than a string literal:
    /// a name, a descriptor, an attribute name or an operand of an attribute
    /// such as `SourceFile`, `Signature` or an annotation value. Rewriting it
    /// would change more than the string constant.
    pub shared: bool,
}

/// Collects user-visible strings loaded by the methods of `class_file`.
///
/// Candidates are deduplicated by Utf8 index and returned in the order they
/// are first loaded. A method whose Code attribute can't be parsed or scanned
/// is logged and contributes nothing.
pub fn resolve_candidates(class_file: &ClassFile, filter: &VisibilityFilter) -> Vec<StringCandidate> {
    let pool = &class_file.constant_pool;

    let mut utf8s = HashMap::new();
    let mut strings = HashMap::new();
    for (index, cp_info) in pool.entries() {
        match cp_info {
            CpInfo::Utf8(utf8) => {
                utf8s.insert(index, utf8.text());
            }
            CpInfo::String { string_index } => {
                strings.insert(index, *string_index);
            }
            _ => {}
        }
    }

    let structural = structural_utf8_indices(class_file);
    let mut candidates: Vec<StringCandidate> = vec![];
    let mut by_utf8: HashMap<u16, usize> = HashMap::new();

    for method in &class_file.methods {
        let method_name = describe_method(class_file, method);
        let sites = match method_ldc_sites(class_file, method) {
            Ok(sites) => sites,
            Err(e) => {
                warn!("Skipping method {method_name}: {e}");
                continue;
            }
        };

        for site in sites.iter().filter(|site| site.kind.may_load_string()) {
            let (utf8_index, string_index) = match strings.get(&site.index) {
                Some(&utf8_index) => (utf8_index, Some(site.index)),
                None => (site.index, None),
            };
            let Some(&text) = utf8s.get(&utf8_index) else {
                continue;
            };
            if !filter.is_user_visible(text) {
                continue;
            }

            match by_utf8.get(&utf8_index) {
                Some(&position) => {
                    let candidate = &mut candidates[position];
                    candidate.occurrences += 1;
                    if candidate.string_index.is_none() {
                        candidate.string_index = string_index;
                    }
                    if !candidate.methods.contains(&method_name) {
                        candidate.methods.push(method_name.clone());
                    }
                }
                None => {
                    debug!(
                        "{} #{} in {method_name} resolves to {text:?}",
                        site.kind.mnemonic(),
                        site.index
                    );
                    by_utf8.insert(utf8_index, candidates.len());
                    candidates.push(StringCandidate {
                        text: text.to_string(),
                        utf8_index,
                        string_index,
                        occurrences: 1,
                        methods: vec![method_name.clone()],
                        shared: structural.contains(&utf8_index),
                    });
                }
            }
        }
    }

    candidates
}

fn method_ldc_sites(class_file: &ClassFile, method: &MethodInfo) -> Result<Vec<LdcSite>, StringsError> {
    match class_file.method_code(method)? {
        Some(code) => Ok(code.ldc_sites()?),
        None => Ok(vec![]),
    }
}

fn describe_method(class_file: &ClassFile, method: &MethodInfo) -> String {
    let name = class_file.method_name(method).unwrap_or("<unknown>");
    let descriptor = class_file.method_descriptor(method).unwrap_or("");
    format!("{name}{descriptor}")
}

/// Every pool index the class uses for something other than a string literal.
fn structural_utf8_indices(class_file: &ClassFile) -> HashSet<u16> {
    let pool = &class_file.constant_pool;
    let mut indices = HashSet::new();

    for (_, cp_info) in pool.entries() {
        if !matches!(cp_info, CpInfo::String { .. }) {
            indices.extend(cp_info.references());
        }
    }

    let members = class_file
        .fields
        .iter()
        .map(|f| (f.name_index, f.descriptor_index, &f.attributes))
        .chain(
            class_file
                .methods
                .iter()
                .map(|m| (m.name_index, m.descriptor_index, &m.attributes)),
        );
    let mut attributes = class_file.attributes.0.iter().collect::<Vec<_>>();
    for (name_index, descriptor_index, member_attributes) in members {
        indices.insert(name_index);
        indices.insert(descriptor_index);
        attributes.extend(member_attributes);
    }

    for attribute in attributes {
        match attribute.utf8_references(pool) {
            Ok(references) => indices.extend(references),
            Err(e) => {
                warn!(
                    "Can't read the operands of attribute {:?}: {e}",
                    pool.utf8(attribute.attribute_name_index).unwrap_or("<unknown>")
                );
                indices.insert(attribute.attribute_name_index);
            }
        }
    }

    indices
}
