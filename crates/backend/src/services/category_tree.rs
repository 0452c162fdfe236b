//! Parent/child integrity for categories.

use shared_types::{Category, CategoryNode};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Would making `new_parent` the parent of `category` close a loop?
///
/// `parents` maps every category of the user to its current parent.
pub fn creates_cycle(
    parents: &HashMap<Uuid, Option<Uuid>>,
    category: Uuid,
    new_parent: Uuid,
) -> bool {
    let mut seen = HashSet::new();
    let mut cursor = Some(new_parent);

    while let Some(current) = cursor {
        if current == category {
            return true;
        }
        // Existing data already loops; refuse to extend it.
        if !seen.insert(current) {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }

    false
}

/// Nest a user's categories under their parents.
///
/// Roots are sorted by `sort_order` then name, children by `sort_order`.
/// A category whose parent is missing from the set is shown as a root.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut children: HashMap<Uuid, Vec<Category>> = HashMap::new();
    let mut roots = Vec::new();

    for category in categories {
        match category.parent_id {
            Some(parent) if ids.contains(&parent) => {
                children.entry(parent).or_default().push(category)
            }
            _ => roots.push(category),
        }
    }

    roots.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

fn attach(category: Category, children: &mut HashMap<Uuid, Vec<Category>>) -> CategoryNode {
    let mut kids = children.remove(&category.id).unwrap_or_default();
    kids.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));

    CategoryNode {
        children: kids
            .into_iter()
            .map(|child| attach(child, children))
            .collect(),
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(user: Uuid, name: &str, parent: Option<Uuid>, sort_order: i32) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            user_id: user,
            parent_id: parent,
            name: name.to_string(),
            sort_order,
            color: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let id = Uuid::new_v4();
        let parents = HashMap::from([(id, None)]);
        assert!(creates_cycle(&parents, id, id));
    }

    #[test]
    fn test_descendant_parent_is_a_cycle() {
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let parents = HashMap::from([
            (root, None),
            (child, Some(root)),
            (grandchild, Some(child)),
        ]);

        assert!(creates_cycle(&parents, root, grandchild));
        assert!(creates_cycle(&parents, child, grandchild));
        assert!(!creates_cycle(&parents, grandchild, root));
    }

    #[test]
    fn test_sibling_parent_is_fine() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parents = HashMap::from([(a, None), (b, None)]);
        assert!(!creates_cycle(&parents, a, b));
    }

    #[test]
    fn test_corrupt_loop_is_refused() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let parents = HashMap::from([(a, Some(b)), (b, Some(a)), (c, None)]);
        assert!(creates_cycle(&parents, c, a));
    }

    #[test]
    fn test_build_tree_nests_and_sorts() {
        let user = Uuid::new_v4();
        let work = category(user, "Work", None, 1);
        let home = category(user, "Home", None, 0);
        let meetings = category(user, "Meetings", Some(work.id), 2);
        let email = category(user, "Email", Some(work.id), 1);
        let urgent = category(user, "Urgent", Some(email.id), 0);

        let tree = build_tree(vec![
            meetings.clone(),
            urgent.clone(),
            work.clone(),
            email.clone(),
            home.clone(),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.id, home.id);
        assert_eq!(tree[1].category.id, work.id);

        let work_children: Vec<Uuid> = tree[1].children.iter().map(|n| n.category.id).collect();
        assert_eq!(work_children, vec![email.id, meetings.id]);
        assert_eq!(tree[1].children[0].children[0].category.id, urgent.id);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let user = Uuid::new_v4();
        let orphan = category(user, "Orphan", Some(Uuid::new_v4()), 0);
        let tree = build_tree(vec![orphan.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category, orphan);
    }
}
