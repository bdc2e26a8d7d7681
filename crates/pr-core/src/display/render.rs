use std::borrow::Cow;
use std::fmt;

use crate::condition::Combinator;

use super::RuleExplanation;
use super::format::one_line;

impl fmt::Display for RuleExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rule: {}", one_line(&self.name))?;
        if let Some(ref id) = self.id {
            writeln!(f, "  Id: {}", one_line(id))?;
        }
        if !self.description.is_empty() {
            writeln!(f, "  Description: {}", one_line(&self.description))?;
        }

        if self.atom_rules.is_empty() {
            writeln!(f, "  (no atom rules)")?;
            return Ok(());
        }

        for (i, atom) in self.atom_rules.iter().enumerate() {
            writeln!(f, "  Atom rule {}:", i + 1)?;

            // Condition
            if atom.conditions.is_empty() {
                let vacuous = match atom.combinator {
                    Combinator::Or => "never matches",
                    _ => "always matches",
                };
                writeln!(f, "    When {} (no conditions, {vacuous})", atom.combinator)?;
            } else {
                writeln!(f, "    When {}:", atom.combinator)?;
            }
            for (j, cond) in atom.conditions.iter().enumerate() {
                let name = if cond.name.is_empty() {
                    Cow::Borrowed("(unnamed)")
                } else {
                    one_line(&cond.name)
                };
                writeln!(f, "      [{}] {}", j + 1, name)?;
                if cond.filters.is_empty() {
                    writeln!(f, "        (no filters, matches every record)")?;
                }
                for line in &cond.filters {
                    writeln!(f, "        {}", one_line(line))?;
                }
            }

            // Action
            writeln!(f, "    Then: {}", one_line(&atom.action))?;
        }

        Ok(())
    }
}
