// src/common/hierarchy.rs
//
// Regras de hierarquia centralizadas em um único módulo puro.
// Toda decisão de acesso dos handlers/serviços passa por aqui,
// o que permite testar as regras sem banco de dados.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Rótulo derivado do nível (1=admin, 2=distribuidor, 3=agência, 4=usuário).
/// Serve apenas para exibição: toda decisão de autorização usa o nível
/// numérico, que é a fonte da verdade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Distributor,
    Agency,
    User,
}

impl Role {
    pub fn from_level(level: i32) -> Self {
        match level {
            ..=1 => Role::Admin,
            2 => Role::Distributor,
            3 => Role::Agency,
            _ => Role::User,
        }
    }
}

/// Nível de um filho criado sob `parent_level`: um nível abaixo, com teto em 4.
pub fn child_level(parent_level: i32) -> i32 {
    (parent_level + 1).min(4)
}

/// Quantos saltos para baixo um chamador de nível 2..=4 enxerga.
/// Admin (nível 1) não usa este limite: tem acesso incondicional.
pub fn reach_of(level: i32) -> usize {
    match level {
        2 => 2,
        3 => 1,
        _ => 0,
    }
}

/// Predicado único de autorização hierárquica.
///
/// `owner_chain` é a cadeia de ancestrais do dono do recurso, do mais
/// próximo (pai) para o mais distante. O chamador acessa o recurso se:
/// - for admin (nível 1), incondicionalmente;
/// - for o próprio dono;
/// - o dono estiver dentro do seu alcance na cadeia (2 saltos para
///   distribuidor, 1 para agência; usuário final só acessa o que é seu).
pub fn can_access(
    caller_level: i32,
    caller_id: Uuid,
    owner_id: Uuid,
    owner_chain: &[Uuid],
) -> bool {
    if caller_level <= 1 {
        return true;
    }
    if caller_id == owner_id {
        return true;
    }
    let hops = reach_of(caller_level);
    owner_chain.iter().take(hops).any(|ancestor| *ancestor == caller_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_follows_level() {
        assert_eq!(Role::from_level(1), Role::Admin);
        assert_eq!(Role::from_level(2), Role::Distributor);
        assert_eq!(Role::from_level(3), Role::Agency);
        assert_eq!(Role::from_level(4), Role::User);
        // Valores fora da faixa caem nos extremos
        assert_eq!(Role::from_level(0), Role::Admin);
        assert_eq!(Role::from_level(9), Role::User);
    }

    #[test]
    fn child_level_is_parent_plus_one_capped_at_four() {
        assert_eq!(child_level(1), 2);
        assert_eq!(child_level(2), 3);
        assert_eq!(child_level(3), 4);
        assert_eq!(child_level(4), 4);
    }

    #[test]
    fn admin_accesses_everything() {
        let admin = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        assert!(can_access(1, admin, stranger, &[]));
    }

    #[test]
    fn everyone_accesses_own_resources() {
        let me = Uuid::new_v4();
        for level in 1..=4 {
            assert!(can_access(level, me, me, &[]));
        }
    }

    #[test]
    fn distributor_sees_children_and_grandchildren_only() {
        // Cenário: admin A cria distribuidor D; D cria agência G; G cria usuário U.
        let a = Uuid::new_v4();
        let d = Uuid::new_v4();
        let g = Uuid::new_v4();
        let u = Uuid::new_v4();

        // Cadeias de ancestrais (mais próximo primeiro)
        let chain_g = [d, a];
        let chain_u = [g, d, a];

        // D enxerga G (filho) e U (neto)
        assert!(can_access(2, d, g, &chain_g));
        assert!(can_access(2, d, u, &chain_u));

        // D não enxerga usuários de outras árvores
        let other = Uuid::new_v4();
        assert!(!can_access(2, d, other, &[Uuid::new_v4()]));

        // Bisneto ficaria fora do alcance de 2 saltos
        let great = Uuid::new_v4();
        let chain_great = [u, g, d, a];
        assert!(!can_access(2, d, great, &chain_great));
    }

    #[test]
    fn agency_sees_direct_children_only() {
        let d = Uuid::new_v4();
        let g = Uuid::new_v4();
        let u = Uuid::new_v4();
        let chain_u = [g, d];

        assert!(can_access(3, g, u, &chain_u));

        // Neto da agência fica fora do alcance de 1 salto
        let grandchild = Uuid::new_v4();
        let chain_grandchild = [u, g, d];
        assert!(!can_access(3, g, grandchild, &chain_grandchild));
    }

    #[test]
    fn end_user_only_accesses_self() {
        let g = Uuid::new_v4();
        let u = Uuid::new_v4();

        // U tenta ver um recurso de G (seu próprio pai): negado
        assert!(!can_access(4, u, g, &[Uuid::new_v4()]));
        assert!(can_access(4, u, u, &[g]));
    }
}
