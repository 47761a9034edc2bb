#![allow(dead_code)]

use anyhow::bail;
use std::{
    any::TypeId,
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
    sync::LazyLock,
};
use strata::{
    ColumnDef, ColumnRef, ConstraintKind, EntityDescriptor, EntityLoader, EntityObject, EntityRef,
    Multiplicity, NavigationDef, PrimaryKeyType, SchemaColumn, StorageGateway, Value,
};

pub fn column(name: &'static str, value: Value) -> ColumnDef {
    ColumnDef {
        column_ref: ColumnRef {
            name,
            ..Default::default()
        },
        value,
        ..Default::default()
    }
}

pub fn erase<T: EntityObject>(value: &Rc<RefCell<T>>) -> EntityRef {
    value.clone()
}

// Customer 1..* Order 1..* OrderLine, all keys by the `Id` convention.

pub struct Customer {
    pub id: i32,
    pub name: Option<String>,
    pub orders: Vec<EntityRef>,
}

impl Customer {
    pub fn new(id: i32, name: &str) -> Rc<RefCell<Customer>> {
        Rc::new(RefCell::new(Customer {
            id,
            name: Some(name.to_string()),
            orders: Vec::new(),
        }))
    }
}

static CUSTOMER: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Customer>(),
    type_name: "Customer",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        ColumnDef {
            nullable: true,
            max_length: Some(100),
            ..column("Name", Value::Varchar(None))
        },
    ],
    navigations: vec![NavigationDef {
        name: "Orders",
        multiplicity: Multiplicity::Many,
        target: order_descriptor,
    }],
});

pub fn customer_descriptor() -> &'static EntityDescriptor {
    &CUSTOMER
}

impl EntityObject for Customer {
    fn descriptor(&self) -> &'static EntityDescriptor {
        customer_descriptor()
    }
    fn get(&self, column: &str) -> Value {
        match column {
            "Id" => Value::Int32(Some(self.id)),
            "Name" => Value::Varchar(self.name.clone()),
            _ => Value::Null,
        }
    }
    fn nav_many(&self, navigation: &str) -> Vec<EntityRef> {
        match navigation {
            "Orders" => self.orders.clone(),
            _ => Vec::new(),
        }
    }
    fn set_nav_many(&mut self, navigation: &str, values: Vec<EntityRef>) {
        if navigation == "Orders" {
            self.orders = values;
        }
    }
}

pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    pub customer: Option<EntityRef>,
    pub lines: Vec<EntityRef>,
}

impl Order {
    pub fn new(id: i32, customer_id: i32) -> Rc<RefCell<Order>> {
        Rc::new(RefCell::new(Order {
            id,
            customer_id,
            customer: None,
            lines: Vec::new(),
        }))
    }
}

static ORDER: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Order>(),
    type_name: "Order",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        column("CustomerId", Value::Int32(None)),
    ],
    navigations: vec![
        NavigationDef {
            name: "Customer",
            multiplicity: Multiplicity::Single,
            target: customer_descriptor,
        },
        NavigationDef {
            name: "Lines",
            multiplicity: Multiplicity::Many,
            target: order_line_descriptor,
        },
    ],
});

pub fn order_descriptor() -> &'static EntityDescriptor {
    &ORDER
}

impl EntityObject for Order {
    fn descriptor(&self) -> &'static EntityDescriptor {
        order_descriptor()
    }
    fn get(&self, column: &str) -> Value {
        match column {
            "Id" => Value::Int32(Some(self.id)),
            "CustomerId" => Value::Int32(Some(self.customer_id)),
            _ => Value::Null,
        }
    }
    fn nav_single(&self, navigation: &str) -> Option<EntityRef> {
        match navigation {
            "Customer" => self.customer.clone(),
            _ => None,
        }
    }
    fn nav_many(&self, navigation: &str) -> Vec<EntityRef> {
        match navigation {
            "Lines" => self.lines.clone(),
            _ => Vec::new(),
        }
    }
    fn set_nav_single(&mut self, navigation: &str, value: EntityRef) {
        if navigation == "Customer" {
            self.customer = Some(value);
        }
    }
    fn set_nav_many(&mut self, navigation: &str, values: Vec<EntityRef>) {
        if navigation == "Lines" {
            self.lines = values;
        }
    }
}

pub struct OrderLine {
    pub id: i32,
    pub order_id: i32,
    pub order: Option<EntityRef>,
}

impl OrderLine {
    pub fn new(id: i32, order_id: i32) -> Rc<RefCell<OrderLine>> {
        Rc::new(RefCell::new(OrderLine {
            id,
            order_id,
            order: None,
        }))
    }
}

static ORDER_LINE: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<OrderLine>(),
    type_name: "OrderLine",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        column("OrderId", Value::Int32(None)),
    ],
    navigations: vec![NavigationDef {
        name: "Order",
        multiplicity: Multiplicity::Single,
        target: order_descriptor,
    }],
});

pub fn order_line_descriptor() -> &'static EntityDescriptor {
    &ORDER_LINE
}

impl EntityObject for OrderLine {
    fn descriptor(&self) -> &'static EntityDescriptor {
        order_line_descriptor()
    }
    fn get(&self, column: &str) -> Value {
        match column {
            "Id" => Value::Int32(Some(self.id)),
            "OrderId" => Value::Int32(Some(self.order_id)),
            _ => Value::Null,
        }
    }
    fn nav_single(&self, navigation: &str) -> Option<EntityRef> {
        match navigation {
            "Order" => self.order.clone(),
            _ => None,
        }
    }
    fn set_nav_single(&mut self, navigation: &str, value: EntityRef) {
        if navigation == "Order" {
            self.order = Some(value);
        }
    }
}

// Schema-only fixtures (never instantiated).

/// Composite key with explicit ordinals.
pub struct Shipment;

static SHIPMENT: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Shipment>(),
    type_name: "Shipment",
    table_name: None,
    columns: vec![
        ColumnDef {
            primary_key: PrimaryKeyType::PartOfPrimaryKey,
            ordinal: Some(1),
            ..column("OrderId", Value::Int32(None))
        },
        ColumnDef {
            primary_key: PrimaryKeyType::PartOfPrimaryKey,
            ordinal: Some(2),
            ..column("LineNo", Value::Int16(None))
        },
        column("Weight", Value::Float64(None)),
    ],
    navigations: Vec::new(),
});

pub fn shipment_descriptor() -> &'static EntityDescriptor {
    &SHIPMENT
}

/// Composite key without ordinals.
pub struct UnorderedPair;

static UNORDERED_PAIR: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<UnorderedPair>(),
    type_name: "UnorderedPair",
    table_name: None,
    columns: vec![
        ColumnDef {
            primary_key: PrimaryKeyType::PartOfPrimaryKey,
            ..column("Left", Value::Int32(None))
        },
        ColumnDef {
            primary_key: PrimaryKeyType::PartOfPrimaryKey,
            ..column("Right", Value::Int32(None))
        },
    ],
    navigations: Vec::new(),
});

pub fn unordered_pair_descriptor() -> &'static EntityDescriptor {
    &UNORDERED_PAIR
}

/// Carries a scalar kind the DDL type table rejects.
pub struct Meter;

static METER: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Meter>(),
    type_name: "Meter",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        column("Uptime", Value::Interval(None)),
    ],
    navigations: Vec::new(),
});

pub fn meter_descriptor() -> &'static EntityDescriptor {
    &METER
}

/// No key marker and no conventional key column.
pub struct Anonymous;

static ANONYMOUS: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Anonymous>(),
    type_name: "Anonymous",
    table_name: None,
    columns: vec![ColumnDef {
        nullable: true,
        ..column("Name", Value::Varchar(None))
    }],
    navigations: Vec::new(),
});

pub fn anonymous_descriptor() -> &'static EntityDescriptor {
    &ANONYMOUS
}

/// Key by the `<TypeName>Id` convention, plus a table name override.
pub struct Widget;

static WIDGET: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Widget>(),
    type_name: "Widget",
    table_name: Some("WidgetCatalog"),
    columns: vec![column("WidgetId", Value::Int32(None))],
    navigations: Vec::new(),
});

pub fn widget_descriptor() -> &'static EntityDescriptor {
    &WIDGET
}

/// Two navigations to the same target with different multiplicities.
pub struct Gadget;

static GADGET: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Gadget>(),
    type_name: "Gadget",
    table_name: None,
    columns: vec![column("Id", Value::Int32(None))],
    navigations: vec![
        NavigationDef {
            name: "Widget",
            multiplicity: Multiplicity::Single,
            target: widget_descriptor,
        },
        NavigationDef {
            name: "Widgets",
            multiplicity: Multiplicity::Many,
            target: widget_descriptor,
        },
    ],
});

pub fn gadget_descriptor() -> &'static EntityDescriptor {
    &GADGET
}

/// Many-to-many cycle partner of `Course`.
pub struct Student;

static STUDENT: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Student>(),
    type_name: "Student",
    table_name: None,
    columns: vec![column("Id", Value::Int32(None))],
    navigations: vec![NavigationDef {
        name: "Courses",
        multiplicity: Multiplicity::Many,
        target: course_descriptor,
    }],
});

pub fn student_descriptor() -> &'static EntityDescriptor {
    &STUDENT
}

pub struct Course;

static COURSE: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Course>(),
    type_name: "Course",
    table_name: None,
    columns: vec![column("Id", Value::Int32(None))],
    navigations: vec![NavigationDef {
        name: "Students",
        multiplicity: Multiplicity::Many,
        target: student_descriptor,
    }],
});

pub fn course_descriptor() -> &'static EntityDescriptor {
    &COURSE
}

/// Composite foreign key to `Shipment`, physical ordinals.
pub struct Invoice;

static INVOICE: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Invoice>(),
    type_name: "Invoice",
    table_name: None,
    columns: vec![
        ColumnDef {
            ordinal: Some(1),
            ..column("Id", Value::Int32(None))
        },
        ColumnDef {
            ordinal: Some(2),
            ..column("ShipmentOrderId", Value::Int32(None))
        },
        ColumnDef {
            ordinal: Some(3),
            ..column("ShipmentLineNo", Value::Int16(None))
        },
    ],
    navigations: vec![NavigationDef {
        name: "Shipment",
        multiplicity: Multiplicity::Single,
        target: shipment_descriptor,
    }],
});

pub fn invoice_descriptor() -> &'static EntityDescriptor {
    &INVOICE
}

/// Composite foreign key declared with key-relative ordinals (1, 2) while
/// the columns physically sit at positions 2 and 3.
pub struct Waybill;

static WAYBILL: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Waybill>(),
    type_name: "Waybill",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        ColumnDef {
            ordinal: Some(1),
            ..column("ShipmentOrderId", Value::Int32(None))
        },
        ColumnDef {
            ordinal: Some(2),
            ..column("ShipmentLineNo", Value::Int16(None))
        },
    ],
    navigations: vec![NavigationDef {
        name: "Shipment",
        multiplicity: Multiplicity::Single,
        target: shipment_descriptor,
    }],
});

pub fn waybill_descriptor() -> &'static EntityDescriptor {
    &WAYBILL
}

/// Self-referencing single-valued navigation.
pub struct Employee;

static EMPLOYEE: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Employee>(),
    type_name: "Employee",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        ColumnDef {
            nullable: true,
            ..column("ManagerId", Value::Int32(None))
        },
    ],
    navigations: vec![NavigationDef {
        name: "Manager",
        multiplicity: Multiplicity::Single,
        target: employee_descriptor,
    }],
});

pub fn employee_descriptor() -> &'static EntityDescriptor {
    &EMPLOYEE
}

/// Unmappable scalar kind next to a navigation to another type.
pub struct Telemetry;

static TELEMETRY: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<Telemetry>(),
    type_name: "Telemetry",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        column("CustomerId", Value::Int32(None)),
        column("Uptime", Value::Interval(None)),
    ],
    navigations: vec![NavigationDef {
        name: "Customer",
        multiplicity: Multiplicity::Single,
        target: customer_descriptor,
    }],
});

pub fn telemetry_descriptor() -> &'static EntityDescriptor {
    &TELEMETRY
}

/// Composite foreign key with only part of the matching columns.
pub struct HalfInvoice;

static HALF_INVOICE: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<HalfInvoice>(),
    type_name: "HalfInvoice",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        ColumnDef {
            ordinal: Some(2),
            ..column("ShipmentOrderId", Value::Int32(None))
        },
    ],
    navigations: vec![NavigationDef {
        name: "Shipment",
        multiplicity: Multiplicity::Single,
        target: shipment_descriptor,
    }],
});

pub fn half_invoice_descriptor() -> &'static EntityDescriptor {
    &HALF_INVOICE
}

/// Composite foreign key columns without explicit ordinals.
pub struct LooseInvoice;

static LOOSE_INVOICE: LazyLock<EntityDescriptor> = LazyLock::new(|| EntityDescriptor {
    type_id: TypeId::of::<LooseInvoice>(),
    type_name: "LooseInvoice",
    table_name: None,
    columns: vec![
        column("Id", Value::Int32(None)),
        column("ShipmentOrderId", Value::Int32(None)),
        column("ShipmentLineNo", Value::Int16(None)),
    ],
    navigations: vec![NavigationDef {
        name: "Shipment",
        multiplicity: Multiplicity::Single,
        target: shipment_descriptor,
    }],
});

pub fn loose_invoice_descriptor() -> &'static EntityDescriptor {
    &LOOSE_INVOICE
}

/// In-memory storage gateway: records every executed statement and keeps a
/// toy relational catalog rebuilt from the `CREATE TABLE` text it receives,
/// which makes synthesize-then-validate round trips meaningful.
#[derive(Default)]
pub struct MockGateway {
    pub executed: Vec<String>,
    pub tables: HashMap<String, Vec<SchemaColumn>>,
    pub constraints: HashMap<String, HashMap<String, Vec<ConstraintKind>>>,
    pub fail_constraints: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn register_ddl(&mut self, sql: &str) {
        let Some(rest) = sql.strip_prefix("CREATE TABLE ") else {
            return;
        };
        let Some((table, _)) = rest.split_once(" (") else {
            return;
        };
        let mut columns = Vec::new();
        let mut constraints: HashMap<String, Vec<ConstraintKind>> = HashMap::new();
        for line in sql.lines().skip(1) {
            let line = line.trim_start_matches('\t').trim_end_matches(',');
            if line.is_empty() || line == ")" {
                continue;
            }
            if line.starts_with("CONSTRAINT ") {
                let kind = if line.contains("PRIMARY KEY(") {
                    ConstraintKind::PrimaryKey
                } else if line.contains("FOREIGN KEY(") {
                    ConstraintKind::ForeignKey
                } else {
                    continue;
                };
                let inside = line
                    .split_once("KEY(")
                    .map(|(_, v)| v)
                    .and_then(|v| v.split(')').next())
                    .unwrap_or("");
                for name in inside.split(", ").filter(|v| !v.is_empty()) {
                    constraints.entry(name.to_string()).or_default().push(kind);
                }
                continue;
            }
            let Some((name, rest)) = line.split_once(' ') else {
                continue;
            };
            let data_type = rest.split(' ').next().unwrap_or("").to_string();
            let max_length = data_type
                .strip_prefix("NVARCHAR(")
                .and_then(|v| v.trim_end_matches(')').parse().ok());
            columns.push(SchemaColumn {
                name: name.to_string(),
                data_type,
                ordinal: columns.len() as u16 + 1,
                is_nullable: !rest.contains("NOT NULL"),
                max_length,
            });
        }
        self.tables.insert(table.to_string(), columns);
        self.constraints.insert(table.to_string(), constraints);
    }
}

impl StorageGateway for MockGateway {
    fn rows_exist(&mut self, table: &str) -> anyhow::Result<bool> {
        Ok(self.tables.contains_key(table))
    }

    fn execute_non_query(&mut self, sql: &str) -> anyhow::Result<()> {
        self.executed.push(sql.to_string());
        self.register_ddl(sql);
        Ok(())
    }

    fn query_columns(&mut self, table: &str) -> anyhow::Result<Vec<SchemaColumn>> {
        match self.tables.get(table) {
            Some(columns) => Ok(columns.clone()),
            None => bail!("no table {table} in catalog"),
        }
    }

    fn query_constraints(
        &mut self,
        table: &str,
        _columns: &[String],
    ) -> anyhow::Result<HashMap<String, Vec<ConstraintKind>>> {
        if self.fail_constraints {
            bail!("constraint view unavailable");
        }
        Ok(self.constraints.get(table).cloned().unwrap_or_default())
    }
}

/// `EntityLoader` over pre-seeded vectors.
#[derive(Default)]
pub struct VecLoader {
    data: HashMap<TypeId, Vec<EntityRef>>,
}

impl VecLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, descriptor: &'static EntityDescriptor, items: Vec<EntityRef>) {
        self.data.entry(descriptor.type_id).or_default().extend(items);
    }
}

impl EntityLoader for VecLoader {
    fn load_all(&self, target: &'static EntityDescriptor) -> Vec<EntityRef> {
        self.data.get(&target.type_id).cloned().unwrap_or_default()
    }
}
