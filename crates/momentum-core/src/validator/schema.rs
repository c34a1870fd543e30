//! Declarative description of the fields a generated plan must carry.
//!
//! A schema is a tree of nodes. Each node lists its required fields in
//! order; a field may own a child node, which applies to every element when
//! the field holds an array, or to the value itself when it holds an object.

use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    /// Value inserted by `apply_defaults` when the field is missing.
    pub default: Value,
    pub child: Option<SchemaNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub fields: Vec<FieldSpec>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required leaf field.
    pub fn field(mut self, name: &str, default: Value) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            default,
            child: None,
        });
        self
    }

    /// Add a required field whose value (or each of its elements) is
    /// checked against `child`.
    pub fn nested(mut self, name: &str, default: Value, child: SchemaNode) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            default,
            child: Some(child),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub root: SchemaNode,
}

impl Schema {
    pub fn new(name: &str, root: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            root,
        }
    }

    /// Look up a built-in schema by name (`diet` or `workout`).
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "diet" | "diet_plan" => Some(Self::diet_plan()),
            "workout" | "workout_plan" => Some(Self::workout_plan()),
            _ => None,
        }
    }

    /// plan -> daily_plans[] -> meals[] -> recipe / nutrition
    pub fn diet_plan() -> Self {
        let recipe = SchemaNode::new()
            .field("ingredients", json!([]))
            .field("instructions", json!([]))
            .field("prep_time_minutes", json!(0));

        let nutrition = SchemaNode::new()
            .field("protein", json!(0))
            .field("carbs", json!(0))
            .field("fat", json!(0));

        let meal = SchemaNode::new()
            .field("meal_type", json!("meal"))
            .field("name", json!("Untitled meal"))
            .field("calories", json!(0))
            .nested("recipe", json!({}), recipe)
            .nested("nutrition", json!({}), nutrition);

        let day = SchemaNode::new()
            .field("day", json!(0))
            .field("total_calories", json!(0))
            .nested("meals", json!([]), meal);

        let root = SchemaNode::new()
            .field("plan_name", json!("Diet plan"))
            .field("summary", json!(""))
            .field("duration_days", json!(0))
            .field("daily_calorie_target", json!(0))
            .nested("daily_plans", json!([]), day);

        Self::new("diet_plan", root)
    }

    /// plan -> days[] -> exercises[]
    pub fn workout_plan() -> Self {
        let exercise = SchemaNode::new()
            .field("name", json!("Exercise"))
            .field("sets", json!(1))
            .field("reps", json!(1))
            .field("rest_seconds", json!(60));

        let day = SchemaNode::new()
            .field("day", json!(0))
            .field("focus", json!("general"))
            .nested("exercises", json!([]), exercise);

        let root = SchemaNode::new()
            .field("plan_name", json!("Workout plan"))
            .field("summary", json!(""))
            .field("goal", json!("general fitness"))
            .field("weeks", json!(1))
            .nested("days", json!([]), day);

        Self::new("workout_plan", root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diet_schema_shape() {
        let schema = Schema::diet_plan();
        let names: Vec<_> = schema.root.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["plan_name", "summary", "duration_days", "daily_calorie_target", "daily_plans"]
        );
        let day = schema.root.fields[4].child.as_ref().unwrap();
        let meal = day.fields[2].child.as_ref().unwrap();
        assert_eq!(meal.fields.len(), 5);
    }

    #[test]
    fn builtin_lookup() {
        assert_eq!(Schema::builtin("diet").unwrap().name, "diet_plan");
        assert_eq!(Schema::builtin("workout").unwrap().name, "workout_plan");
        assert!(Schema::builtin("sleep").is_none());
    }
}
