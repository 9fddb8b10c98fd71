/// Privilege class of a user. The numeric ids match the seeded `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Operator,
    Supervisor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operator, Role::Supervisor];

    pub fn id(self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Operator => 2,
            Role::Supervisor => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Operator => "OPERATOR",
            Role::Supervisor => "SUPERVISOR",
        }
    }

    pub fn from_id(id: i32) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.id() == id)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
